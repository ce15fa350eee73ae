//! Bear Rally Optimizer — CLI.

use bear_optimizer::config::EngineConfig;
use bear_optimizer::damage::formation_damage;
use bear_optimizer::fraction::Mode;
use bear_optimizer::model::{StatPair, Troops, UnitStats};
use bear_optimizer::plan::{compute, PlanInputs};
use bear_optimizer::report::{plan_to_json, render_text, write_json_report};
use bear_optimizer::tiers::TierTable;
use bear_optimizer::util::{init_logging, sanitize_count, sanitize_stat};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bear-optimizer")]
#[command(about = "Bear Rally Optimizer (troop ratio solver + formation allocator)")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataArgs {
    #[arg(long, value_name = "JSON", default_value = "tiers.json")]
    tiers: PathBuf,
    #[arg(long, value_name = "TOML", help = "Optional engine config overriding built-in constants")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the call rally and join marches, recommend a march count, and score them.
    Plan {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long, default_value = "T6")]
        tier: String,
        #[arg(long, default_value = "ratio", help = "ratio, balanced or magic")]
        mode: Mode,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        stock_inf: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        stock_cav: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        stock_arc: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        rally_size: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        join_cap: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        joins: f64,
        #[arg(long, value_name = "I/C/A", help = "Manual split, e.g. 50/30/20")]
        ratio: Option<String>,
        #[arg(long, help = "Build the recommended number of joins instead of --joins")]
        use_recommended: bool,
        #[command(flatten)]
        stats: StatArgs,
        #[arg(long, help = "Print the plan as JSON instead of text")]
        json: bool,
        #[arg(long, value_name = "DIR", help = "Also write plan.json into this directory")]
        out: Option<PathBuf>,
    },
    /// Score one formation against the bear.
    Damage {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long, default_value = "T6")]
        tier: String,
        #[arg(long, default_value_t = 0)]
        inf: u32,
        #[arg(long, default_value_t = 0)]
        cav: u32,
        #[arg(long, default_value_t = 0)]
        arc: u32,
    },
    /// List tiers and their base attack values.
    Tiers {
        #[arg(long, value_name = "JSON", default_value = "tiers.json")]
        tiers: PathBuf,
    },
}

#[derive(Args)]
struct StatArgs {
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    inf_atk: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    inf_let: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    cav_atk: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    cav_let: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    arc_atk: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    arc_let: f64,
}

impl StatArgs {
    fn to_stats(&self) -> UnitStats {
        let pair = |attack: f64, lethality: f64| StatPair {
            attack: sanitize_stat(attack),
            lethality: sanitize_stat(lethality),
        };
        UnitStats {
            inf: pair(self.inf_atk, self.inf_let),
            cav: pair(self.cav_atk, self.cav_let),
            arc: pair(self.arc_atk, self.arc_let),
        }
    }
}

fn load_data(data: &DataArgs) -> Result<(TierTable, EngineConfig), String> {
    let cfg = EngineConfig::load(data.config.as_deref())?;
    let tiers = TierTable::load(&data.tiers);
    Ok((tiers, cfg))
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Plan {
            data,
            tier,
            mode,
            stock_inf,
            stock_cav,
            stock_arc,
            rally_size,
            join_cap,
            joins,
            ratio,
            use_recommended,
            stats,
            json,
            out,
        } => {
            let inputs = PlanInputs {
                mode,
                tier_id: tier,
                stock: Troops::new(
                    sanitize_count(stock_inf),
                    sanitize_count(stock_cav),
                    sanitize_count(stock_arc),
                ),
                rally_size: sanitize_count(rally_size),
                join_cap: sanitize_count(join_cap),
                join_count: sanitize_count(joins),
                stats: stats.to_stats(),
                manual_ratio: ratio,
                use_recommended,
            };
            run_plan(&data, &inputs, json, out)
        }
        Commands::Damage {
            data,
            tier,
            inf,
            cav,
            arc,
        } => run_damage(&data, &tier, Troops::new(inf, cav, arc)),
        Commands::Tiers { tiers } => run_tiers(tiers),
    }
}

fn run_plan(
    data: &DataArgs,
    inputs: &PlanInputs,
    json: bool,
    out: Option<PathBuf>,
) -> Result<(), String> {
    let (tiers, cfg) = load_data(data)?;
    let plan = compute(inputs, &tiers, &cfg);
    for d in &plan.diagnostics {
        tracing::debug!("[{}] {}", d.code, d.summary);
    }
    if json {
        println!("{}", plan_to_json(&plan)?);
    } else {
        print!("{}", render_text(&plan));
    }
    if let Some(dir) = out {
        fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
        let path = dir.join("plan.json");
        write_json_report(&plan, &path)?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}

fn run_damage(data: &DataArgs, tier: &str, formation: Troops) -> Result<(), String> {
    let (tiers, cfg) = load_data(data)?;
    let r = formation_damage(&formation, tier, &tiers, &cfg);
    println!(
        "Formation {}/{}/{} on {}: inf={:.3} cav={:.3} arc={:.3} round10={:.3} score={}",
        formation.inf,
        formation.cav,
        formation.arc,
        tier.trim(),
        r.by_type.inf,
        r.by_type.cav,
        r.by_type.arc,
        r.round10_total,
        r.final_score
    );
    Ok(())
}

fn run_tiers(path: PathBuf) -> Result<(), String> {
    let tiers = TierTable::load(&path);
    if tiers.is_empty() {
        println!("No tiers loaded from {}", path.display());
        return Ok(());
    }
    for id in tiers.ids() {
        match tiers.base_attack(id) {
            Some(b) => println!("{}  Base ATK {}/{}/{}", id, b.inf, b.cav, b.arc),
            None => println!("{}  (incomplete)", id),
        }
    }
    Ok(())
}
