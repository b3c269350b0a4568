use anyhow::Context;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::{info, warn};
use pktgen::{pktgen_batch, pktgen_ctx, BATCH_CAPACITY};
use pktgen_core::{PktgenError, PktgenResult};
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};

#[derive(Parser)]
#[command(name = "pktgen-driver", about = "Pulls packet batches through the pktgen C ABI")]
struct Cli {
    /// Initial batch size (pktgen_new_v2). Omit to use the legacy pktgen_new_v1.
    #[arg(long)] initial: Option<u8>,
    /// Number of batches to fetch. 0 runs until Ctrl-C.
    #[arg(long, default_value_t = 5)] batches: u64,
    /// Print every packet length.
    #[arg(long)] dump: bool,
    /// Print bindings for the given language and exit.
    #[arg(value_enum, long)] emit: Option<Emit>,
}

#[derive(Debug, Clone, ValueEnum)]
enum Emit {
    C,
    Rust,
}

/// Owns one context handle; deletes it on drop.
struct Session {
    ctx: *mut pktgen_ctx,
}

impl Session {
    fn open(initial: Option<u8>) -> PktgenResult<Self> {
        let ctx = match initial {
            Some(n) => pktgen::pktgen_new_v2(n),
            None => pktgen::pktgen_new_v1(),
        };
        if ctx.is_null() {
            return Err(PktgenError::AllocFailure);
        }
        Ok(Self { ctx })
    }

    fn fetch_batch(&mut self, batch: &mut Batch) -> PktgenResult<()> {
        PktgenError::check(pktgen::pktgen_fetch_batch_v1(self.ctx, &mut batch.0))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        pktgen::pktgen_delete_v1(self.ctx);
    }
}

struct Batch(pktgen_batch);

impl Default for Batch {
    fn default() -> Self {
        // pktgen_batch is plain data, designed to start zeroed
        Self(pktgen_batch::default())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.emit {
        Some(Emit::C) => {
            print!("{}", pktgen::abi::c_header());
            return Ok(());
        }
        Some(Emit::Rust) => {
            print!("{}", pktgen::abi::rust_bindings());
            return Ok(());
        }
        None => {}
    }

    if let Some(n) = cli.initial {
        if n as usize > BATCH_CAPACITY {
            warn!(
                "initial {} exceeds batch capacity {}; the first fetch will abort",
                n, BATCH_CAPACITY
            );
        }
    }

    let mut session = Session::open(cli.initial).context("failed to create context")?;
    let mut batch = Batch::default();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        warn!("Signal received. Stopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    if cli.batches == 0 {
        info!("Fetching batches until interrupted");
    } else {
        info!("Fetching {} batches", cli.batches);
    }

    let mut i = 0u64;
    while running.load(Ordering::SeqCst) && (cli.batches == 0 || i < cli.batches) {
        session
            .fetch_batch(&mut batch)
            .with_context(|| format!("fetch of batch {} failed", i))?;

        let bytes: usize = batch.0.packets().iter().map(|p| p.payload().len()).sum();
        println!("{} {}: {} packets, {} bytes", "batch".green(), i, batch.0.count, bytes);
        if cli.dump {
            for (j, pkt) in batch.0.packets().iter().enumerate() {
                println!("  {} {}: len {}", "pkt".cyan(), j, pkt.len);
            }
        }
        i += 1;
    }

    Ok(())
}
