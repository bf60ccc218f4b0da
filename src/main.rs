//! Goods Exchange - demo binary.
//!
//! Runs one market center with producers and consumers of two goods and logs
//! every tick. Configuration is read from the YAML file given as the first
//! argument, or from `EXCHANGE_CONFIG`, or falls back to the defaults.
//!
//! ```text
//! goods-exchange [config.yaml]
//! RUST_LOG=goods_exchange=debug goods-exchange
//! ```

use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use goods_exchange::config::{EngineConfig, LoggingConfig};
use goods_exchange::sim::{MarketCenter, Simulation, Trader};
use goods_exchange::types::{AgentId, GoodId, MarketId};
use goods_exchange::ResourceLedger;

const FOOD: GoodId = GoodId(1);
const TOOLS: GoodId = GoodId(2);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    init_logging(&config.logging)?;

    info!(
        ticks = config.simulation.ticks,
        history_len = config.simulation.history_len,
        reset_books_each_tick = config.simulation.reset_books_each_tick,
        "configuration loaded"
    );

    let prices: ResourceLedger = [(FOOD, 1.0), (TOOLS, 10.0)].into_iter().collect();
    let mut center = MarketCenter::new(MarketId(1), &config).with_prices(prices);

    // Food is oversupplied, tools are scarce
    let mut agent = 0;
    let mut next_agent = || {
        agent += 1;
        AgentId(agent)
    };
    for _ in 0..4 {
        center.add_participant(Box::new(
            Trader::seller(next_agent(), FOOD, 5.0, 1.0).with_spread(0.05),
        ));
    }
    for _ in 0..3 {
        center.add_participant(Box::new(
            Trader::buyer(next_agent(), FOOD, 4.0, 1.0).with_spread(0.02),
        ));
    }
    center.add_participant(Box::new(
        Trader::seller(next_agent(), TOOLS, 1.0, 10.0).with_spread(0.01),
    ));
    for _ in 0..3 {
        center.add_participant(Box::new(
            Trader::buyer(next_agent(), TOOLS, 1.0, 10.0).with_spread(-0.02),
        ));
    }

    let mut sim = Simulation::new();
    sim.add_center(center);

    for report in sim.run(config.simulation.ticks)? {
        for change in &report.price_changes {
            info!(
                market = %report.market,
                tick = report.tick,
                good = %change.good,
                old = change.old,
                new = change.new,
                sd_ratio = change.sd_ratio,
                movement = ?change.movement,
                "price"
            );
        }
    }

    if let Some(center) = sim.center(MarketId(1)) {
        let market = center.market();
        info!(
            food = market.price(FOOD),
            tools = market.price(TOOLS),
            resting = center.house().order_count(),
            total_fills = center.engine().total_fills(),
            "final prices"
        );
    }

    Ok(())
}

fn load_config() -> Result<EngineConfig, goods_exchange::ConfigError> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("EXCHANGE_CONFIG").map(PathBuf::from));

    match path {
        Some(path) => EngineConfig::from_file(&path),
        None => Ok(EngineConfig::default()),
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
