use shield_options::*;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Args, Command, Config};
use log::{info, warn};
use std::sync::Arc;

use client::ShieldClient;
use domain::time::time_to_expiry;
use domain::*;
use execution::{FillOrderCall, RfqRequest};
use monitor::{OrderBookSnapshot, OrderMonitor};
use payoff::{compute_payoff_curve, PayoffParams};
use strategy::{rank_puts, select_best_put, ProtectionPlanner};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    match args.command {
        Command::Payoff {
            strike,
            premium,
            spot,
            kind,
            short,
            size,
        } => {
            let position = if short { Position::Short } else { Position::Long };
            let curve = compute_payoff_curve(strike, premium, spot, kind, position, size);
            let params = PayoffParams {
                strike,
                premium,
                current_price: spot,
                kind,
                position,
                size,
            };
            print_curve(&curve, params.breakeven());
        }

        Command::Rfq {
            kind,
            asset,
            strike,
            size,
            expiry_days,
            short,
        } => {
            let request = RfqRequest {
                kind,
                asset,
                strike,
                size,
                expiry_days,
                position: if short { Position::Short } else { Position::Long },
            };
            let call = request.build(&config.market, chrono::Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&call)?);
        }

        Command::Orders { asset } => {
            let snapshot = order_monitor(&config)?.fetch_snapshot().await?;
            print_orders(&snapshot, asset);
        }

        Command::Protect {
            asset,
            portfolio,
            level,
            advanced,
        } => {
            let snapshot = order_monitor(&config)?.fetch_snapshot().await?;
            let planner = ProtectionPlanner::new(&config.protection);
            let request = planner.request(asset, portfolio, level, &snapshot.prices)?;

            let Some(quote) = planner.plan(&snapshot.orders, request) else {
                println!("No matching put options available. Try adjusting your protection level.");
                return Ok(());
            };

            print_quote(&quote, &snapshot);

            if advanced {
                let params = quote.payoff_params();
                print_curve(&params.curve(), params.breakeven());
            } else {
                print_scenarios(&quote.scenario_table());
            }
        }

        Command::Fill { id, size } => {
            let snapshot = order_monitor(&config)?.fetch_snapshot().await?;
            let order = snapshot
                .orders
                .iter()
                .find(|o| o.id == id)
                .with_context(|| format!("Order {} not in the current book", id))?;

            let call = FillOrderCall::build(order, size, &config.market)?;
            println!("{}", serde_json::to_string_pretty(&call)?);
        }

        Command::Chart { asset, days } => {
            let api = ShieldClient::new(&config.api)?;
            let candles = api.fetch_candles(asset, days).await?;
            print_candles(asset, days, &candles);
        }

        Command::Watch => {
            let planner = ProtectionPlanner::new(&config.protection);
            info!("👀 Watching order book ({}% protection)", planner.default_level());

            order_monitor(&config)?
                .start_monitoring(move |snapshot| {
                    let planner = planner.clone();
                    async move {
                        for asset in [Asset::Eth, Asset::Btc] {
                            let Some(target) = planner.default_target(asset, &snapshot.prices) else {
                                warn!("⚠️ No {} spot price in this refresh", asset);
                                continue;
                            };

                            let spot = snapshot.prices.price_of(asset);
                            match select_best_put(&snapshot.orders, asset, target) {
                                Some(o) => info!(
                                    "🛡️ {} spot ${:.2} | best {}% put: strike ${:.2} @ ${:.2}",
                                    asset,
                                    spot,
                                    planner.default_level(),
                                    o.strike,
                                    o.price
                                ),
                                None => info!("🛡️ {} spot ${:.2} | no sell-side puts", asset, spot),
                            }
                        }
                    }
                })
                .await;
        }
    }

    Ok(())
}

// ===============================
// BACKEND
// ===============================
fn order_monitor(config: &Config) -> Result<OrderMonitor> {
    let api = Arc::new(ShieldClient::new(&config.api)?);

    Ok(OrderMonitor::new(
        api,
        config.market.clone(),
        config.api.poll_interval_ms,
    ))
}

// ===============================
// OUTPUT
// ===============================

fn print_orders(snapshot: &OrderBookSnapshot, asset: Option<Asset>) {
    println!(
        "ETH: ${:.2} | BTC: ${:.2} | {} orders ({} skipped)",
        snapshot.prices.eth,
        snapshot.prices.btc,
        snapshot.orders.len(),
        snapshot.skipped
    );
    println!("──────────────────────────────────────────────────────────────");
    println!(
        "{:<22} {:<5} {:<5} {:<5} {:>12} {:>10} {:>14} {:>8}",
        "ID", "ASSET", "TYPE", "SIDE", "STRIKE", "PRICE", "MAX SIZE", "EXPIRY"
    );

    for o in snapshot
        .orders
        .iter()
        .filter(|o| asset.map_or(true, |a| o.asset == a))
    {
        println!(
            "{:<22} {:<5} {:<5} {:<5} {:>12.2} {:>10.2} {:>14.4} {:>8}",
            o.id,
            o.asset,
            o.kind,
            if o.is_long { "BUY" } else { "SELL" },
            o.strike,
            o.price,
            o.max_size,
            time_to_expiry(o.expiry, snapshot.fetched_at)
        );
    }
}

fn print_quote(quote: &ProtectionQuote, snapshot: &OrderBookSnapshot) {
    let req = &quote.request;

    println!("📋 Protection Summary");
    println!("──────────────────────────");
    println!("Portfolio Value        ${:.2}", req.portfolio_value_usd);
    println!("Current {} Price      ${:.2}", req.asset, req.current_price);
    println!("Protected Below        ${:.2}", quote.target_strike);
    println!("Best Available Strike  ${:.2}", quote.order.strike);
    println!("Estimated Premium      ${:.2}", quote.estimated_premium);
    println!(
        "Order                  {} (expires in {})",
        quote.order.id,
        time_to_expiry(quote.order.expiry, snapshot.fetched_at)
    );

    let alternatives = rank_puts(&snapshot.orders, req.asset, quote.target_strike);
    if alternatives.len() > 1 {
        println!("Alternatives:");
        for o in alternatives.iter().skip(1).take(3) {
            println!("  {} strike ${:.2} @ ${:.2}", o.id, o.strike, o.price);
        }
    }
    println!();
}

fn print_scenarios(table: &ScenarioTable) {
    println!("{:<18} {:>16} {:>16}", "Scenario", "Without Shield", "With Shield");
    for row in &table.rows {
        println!(
            "{:<18} {:>+16.2} {:>+16.2}",
            row.label, row.without_protection, row.with_protection
        );
    }
    println!();
    println!(
        "Max Loss with Shield: ${:.2} (premium + gap to strike)",
        table.max_loss
    );
}

fn print_candles(asset: Asset, days: u32, candles: &[Candle]) {
    println!("{} / USD, last {}d ({} candles)", asset, days, candles.len());
    println!(
        "{:<17} {:>12} {:>12} {:>12} {:>12}",
        "TIME (UTC)", "OPEN", "HIGH", "LOW", "CLOSE"
    );
    for c in candles {
        let time = chrono::DateTime::<chrono::Utc>::from_timestamp(c.time, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| c.time.to_string());
        println!(
            "{:<17} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
            time, c.open, c.high, c.low, c.close
        );
    }

    if let Some(change) = price_change_percent(candles) {
        println!("Change: {:+.2}%", change);
    }
}

fn print_curve(curve: &[PayoffPoint], breakeven: f64) {
    println!(
        "{:>12} {:>14} {:>14} {:>14}",
        "PRICE", "OPTION P&L", "UNPROTECTED", "PROTECTED"
    );
    for p in curve {
        println!(
            "{:>12.2} {:>14.2} {:>14.2} {:>14.2}",
            p.price, p.payoff, p.unprotected, p.protected
        );
    }
    println!("Breakeven: ${:.2}", breakeven);
}
