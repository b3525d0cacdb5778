//! Session runtime: wires settings, catalog, selection and the list worker
//! together and prints every derived list.

use std::io::Write;
use std::pin::pin;
use std::sync::Arc;

use tokio::select;
use tokio::sync::{mpsc, watch as watch_channel};
use tokio::time::Duration;

use crate::args::Args;
use crate::logic::Collation;
use crate::settings;
use crate::sources::{PackageCatalog, read_records};
use crate::state::{PackageKey, SelectionSet};

pub mod observer;
pub mod watch;

pub use observer::{ListInputs, Subscription, subscribe};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// What: Render one derived list for stdout.
///
/// Inputs:
/// - `list`: Ordered package keys
/// - `json`: Emit a JSON array instead of one key per line
///
/// Output:
/// - Rendered text without a trailing newline
pub fn render_list(list: &[PackageKey], json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string(list)?)
    } else {
        Ok(list.join("\n"))
    }
}

/// What: Run one appselect session on stdout until Ctrl-C.
///
/// Inputs:
/// - `args`: Parsed command line
///
/// Output:
/// - Same as [`run_until`]
pub async fn run(args: Args) -> Result<()> {
    run_until(args, std::io::stdout(), async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// What: Run one appselect session, writing every derived list to `out`.
///
/// Inputs:
/// - `args`: Parsed command line
/// - `out`: Sink for rendered lists; flushed after each one
/// - `stop`: Ends a `--watch` session when it completes
///
/// Output:
/// - `Ok(())` after the first list (or, with `--watch`, once `stop` completes);
///   `Err` for invalid settings, an unreadable catalog, missing collation data
///   or a failed write
///
/// Details:
/// - Settings come from `settings.conf`; command-line flags override them.
/// - With `--watch`, catalog edits are republished as snapshots and settings
///   edits are pushed as config changes. A reload that fails is logged and the
///   previous state is kept. Each list is followed by a `--` line.
pub async fn run_until<W, S>(args: Args, mut out: W, stop: S) -> Result<()>
where
    W: Write,
    S: Future<Output = ()>,
{
    let settings_path = args.settings_path();
    let prefs = settings::load_settings(&settings_path)?;
    let config = args.sort_config(prefs);
    let collation = match args.locale.as_deref() {
        Some(tag) => Collation::for_locale(tag)?,
        None => Collation::from_system()?,
    };
    tracing::info!(locale = collation.locale(), ?config, "session configured");

    let catalog = Arc::new(PackageCatalog::load(&args.catalog)?);
    let selection = SelectionSet::new(args.selection_mode(), args.selected.iter().cloned());
    for key in selection.keys() {
        if catalog.record(&key).is_none() {
            tracing::warn!(package = %key, "checked package is not in the catalog");
        }
    }

    let (config_tx, config_rx) = watch_channel::channel(config);
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Vec<PackageKey>>();
    let subscription = subscribe(
        ListInputs {
            snapshots: catalog.subscribe(),
            config: config_rx,
            selection,
            metadata: Arc::clone(&catalog),
            collation: Arc::new(collation),
        },
        move |list: &[PackageKey]| {
            let _ = out_tx.send(list.to_vec());
        },
    );

    let mut pollers = Vec::new();
    if args.watch {
        let every = Duration::from_millis(args.poll_ms);
        let cat = Arc::clone(&catalog);
        pollers.push(watch::spawn_file_poller(
            args.catalog.clone(),
            every,
            move |path| match read_records(path).and_then(|r| cat.replace(r)) {
                Ok(()) => tracing::info!(path = %path.display(), count = cat.len(), "catalog reloaded"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "catalog reload failed; keeping previous"),
            },
        ));
        let session_args = args.clone();
        pollers.push(watch::spawn_file_poller(
            settings_path,
            every,
            move |path| match settings::load_settings(path) {
                Ok(prefs) => {
                    let next = session_args.sort_config(prefs);
                    config_tx.send_if_modified(|cur| {
                        let changed = *cur != next;
                        *cur = next;
                        changed
                    });
                }
                Err(e) => tracing::warn!(error = %e, "settings reload failed; keeping previous"),
            },
        ));
    }

    let mut stop = pin!(stop);
    loop {
        select! {
            next = out_rx.recv() => {
                let Some(list) = next else { break };
                let text = render_list(&list, args.json)?;
                writeln!(out, "{text}")?;
                if args.watch {
                    writeln!(out, "--")?;
                }
                out.flush()?;
                if !args.watch {
                    break;
                }
            }
            () = &mut stop => {
                tracing::info!("session stopped");
                break;
            }
        }
    }

    for p in pollers {
        p.abort();
    }
    subscription.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_list_plain_and_json() {
        let list = vec!["b.app".to_string(), "a.app".to_string()];
        assert_eq!(render_list(&list, false).unwrap(), "b.app\na.app");
        assert_eq!(render_list(&list, true).unwrap(), r#"["b.app","a.app"]"#);
        assert_eq!(render_list(&[], false).unwrap(), "");
    }
}
