//! Run a single house registry invocation against a world-state snapshot.
//!
//! This binary delegates to `house_registry::cli` for parsing and the
//! invocation flow. Payloads go to stdout; logs and failure messages go to
//! stderr.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use house_registry::cli::{InvokeError, run_from};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    if let Err(err) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %err, "tracing init failed");
    }

    match run_from(env::args_os()) {
        Ok(payload) => {
            write_payload(&payload);
            ExitCode::SUCCESS
        }
        Err(InvokeError::Usage(err)) => err.exit(),
        Err(err) => {
            if let Err(write_err) = writeln!(io::stderr().lock(), "{err}") {
                drop(write_err);
            }
            ExitCode::FAILURE
        }
    }
}

fn write_payload(payload: &[u8]) {
    if payload.is_empty() {
        return;
    }
    let mut out = io::stdout().lock();
    if let Err(err) = out.write_all(payload).and_then(|()| writeln!(out)) {
        drop(err);
    }
}
