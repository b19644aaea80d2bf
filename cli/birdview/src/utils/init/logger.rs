use std::sync::OnceLock;

use log::error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::{EnvFilter, Registry};

use crate::commands::Verbosity;
use crate::utils::TERMINAL_STDERR;

struct LockingTerminalStderr;
impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LockingTerminalStderr {
    type Writer = LockingTerminalStderr;

    fn make_writer(&'a self) -> Self::Writer {
        LockingTerminalStderr
    }
}

impl std::io::Write for LockingTerminalStderr {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(mut guard) = TERMINAL_STDERR.lock() {
            guard.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if let Ok(mut guard) = TERMINAL_STDERR.lock() {
            guard.flush()?
        }
        Ok(())
    }
}

static LOGGER_HANDLE: OnceLock<Handle<EnvFilter, Registry>> = OnceLock::new();

/// Log filter for our own crates at the given verbosity.
///
/// `$RUST_LOG` takes precedence when set.
pub(crate) fn log_filter(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "off,birdview=error,birdview_sdk=error,nuthatch_catalog=error",
        Verbosity::Verbose(0) => "off,birdview=warn,birdview_sdk=warn,nuthatch_catalog=warn",
        Verbosity::Verbose(1) => "off,birdview=info,birdview_sdk=info,nuthatch_catalog=info",
        Verbosity::Verbose(2) => "off,birdview=debug,birdview_sdk=debug,nuthatch_catalog=debug",
        Verbosity::Verbose(3) => "off,birdview=trace,birdview_sdk=trace,nuthatch_catalog=trace",
        // Also show http internals
        Verbosity::Verbose(_) => "trace",
    }
}

pub(crate) fn init_logger(verbosity: Option<Verbosity>) {
    let log_filter = log_filter(verbosity.unwrap_or_default());

    let filter_handle = LOGGER_HANDLE.get_or_init(|| {
        // The first filter sets an upper bound for `log` records,
        // start at `trace` and narrow it down through the reload handle.
        let filter = EnvFilter::new("trace");
        let (filter, reload_handle) = tracing_subscriber::reload::Layer::new(filter);
        let log_layer = tracing_subscriber::fmt::layer()
            .with_writer(LockingTerminalStderr)
            .with_filter(filter);

        tracing_subscriber::registry().with(log_layer).init();
        reload_handle
    });

    update_filters(filter_handle, log_filter);
}

fn update_filters(filter_handle: &Handle<EnvFilter, Registry>, log_filter: &str) {
    let result = filter_handle.modify(|layer| {
        match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_filter)) {
            Ok(new_filter) => *layer = new_filter,
            Err(err) => {
                error!("Updating logger filter failed: {}", err);
            },
        };
    });
    if let Err(err) = result {
        error!("Updating logger filter failed: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_verbosity_has_a_valid_filter() {
        for verbosity in [
            Verbosity::Quiet,
            Verbosity::Verbose(0),
            Verbosity::Verbose(1),
            Verbosity::Verbose(2),
            Verbosity::Verbose(3),
            Verbosity::Verbose(7),
        ] {
            let filter = log_filter(verbosity);
            assert!(
                EnvFilter::try_new(filter).is_ok(),
                "invalid filter for {verbosity:?}: {filter}"
            );
        }
    }

    #[test]
    fn default_verbosity_shows_warnings() {
        assert!(log_filter(Verbosity::default()).contains("birdview=warn"));
    }
}
