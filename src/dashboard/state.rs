// src/dashboard/state.rs

use serde::Serialize;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use crate::chart::{self, ChartView, NO_DATA_MESSAGE};
use crate::config::Config;
use crate::fetch;
use crate::sheet::{self, Table};

/// Everything the web layer shows, captured at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub refreshing: bool,
    /// Latest pipeline failure, "❌"-prefixed; empty means the last load
    /// succeeded.
    pub error: String,
    pub view: ChartView,
}

/// Shared dashboard state: the displayed chart pair, the error slot, and the
/// busy flag of the refresh machine. The refresh handler is the only writer;
/// the web layer reads snapshots or receives them on the broadcast channel.
pub struct DashboardState {
    config: Config,
    client: reqwest::Client,
    display: Mutex<Display>,
    refreshing: AtomicBool,
    updates: broadcast::Sender<Snapshot>,
}

struct Display {
    view: ChartView,
    error: String,
}

/// Clears the busy flag on every exit path out of a refresh.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl DashboardState {
    pub fn new(config: Config) -> Arc<Self> {
        let (updates, _) = broadcast::channel(16);
        Arc::new(Self {
            config,
            client: reqwest::Client::new(),
            display: Mutex::new(Display {
                view: ChartView::Placeholder {
                    message: NO_DATA_MESSAGE.to_string(),
                },
                error: String::new(),
            }),
            refreshing: AtomicBool::new(false),
            updates,
        })
    }

    pub fn allowed_ws_origin(&self) -> Option<&str> {
        self.config.allowed_ws_origin.as_deref()
    }

    pub fn snapshot(&self) -> Snapshot {
        let display = self.display.lock().unwrap();
        Snapshot {
            refreshing: self.refreshing.load(Ordering::SeqCst),
            error: display.error.clone(),
            view: display.view.clone(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.updates.subscribe()
    }

    /// Run fetch → load → render once and swap in the result.
    ///
    /// A trigger while a refresh is already in flight is a no-op that returns
    /// the current snapshot. A failed download keeps the previously displayed
    /// charts; a failed parse degrades to the empty table. Every completed
    /// refresh is broadcast to websocket subscribers.
    pub async fn refresh(&self) -> Snapshot {
        if self.refreshing.swap(true, Ordering::SeqCst) {
            debug!("refresh already in flight; ignoring trigger");
            return self.snapshot();
        }
        let busy = BusyGuard(&self.refreshing);

        match fetch::download_workbook(
            &self.client,
            &self.config.shared_link,
            &self.config.workbook_path,
        )
        .await
        {
            Err(e) => {
                warn!("download failed: {}", e);
                // Displayed charts stay as they were.
                self.set_error(format!("❌ {}", e));
            }
            Ok(()) => {
                let table = match sheet::load_sheet(&self.config.workbook_path, &self.config.sheet_name)
                {
                    Ok(table) => {
                        self.set_error(String::new());
                        table
                    }
                    Err(e) => {
                        warn!("load failed: {}", e);
                        self.set_error(format!("❌ {}", e));
                        Table::empty()
                    }
                };
                match chart::render(&table) {
                    Ok(view) => self.display.lock().unwrap().view = view,
                    Err(e) => error!("chart rendering failed: {:#}", e),
                }
            }
        }

        drop(busy);
        let snapshot = self.snapshot();
        let _ = self.updates.send(snapshot.clone());
        snapshot
    }

    fn set_error(&self, message: String) {
        self.display.lock().unwrap().error = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::path::Path;
    use tokio::task::JoinHandle;
    use warp::Filter;

    fn workbook_bytes() -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("ventas").unwrap();
        worksheet.write_string(0, 0, "dia").unwrap();
        worksheet.write_string(0, 1, "valor").unwrap();
        worksheet.write_string(1, 0, "Mon").unwrap();
        worksheet.write_number(1, 1, 10).unwrap();
        worksheet.write_string(2, 0, "Mon").unwrap();
        worksheet.write_number(2, 1, 5).unwrap();
        worksheet.write_string(3, 0, "Tue").unwrap();
        worksheet.write_number(3, 1, 3).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    fn spawn_server(body: Vec<u8>) -> (SocketAddr, JoinHandle<()>) {
        let route = warp::any().map(move || body.clone());
        let (addr, fut) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        (addr, tokio::spawn(fut))
    }

    fn config_for(addr: SocketAddr, dir: &Path) -> Config {
        Config {
            shared_link: format!("http://{}/s/libro?x=1", addr),
            sheet_name: "ventas".to_string(),
            workbook_path: dir.join("ventas.xlsx"),
            allowed_ws_origin: None,
            advertised_port: None,
        }
    }

    #[tokio::test]
    async fn refresh_renders_charts_and_clears_error() {
        let (addr, _server) = spawn_server(workbook_bytes());
        let dir = tempfile::tempdir().unwrap();
        let state = DashboardState::new(config_for(addr, dir.path()));

        let snapshot = state.refresh().await;
        assert!(!snapshot.refreshing);
        assert!(snapshot.error.is_empty());
        assert!(matches!(snapshot.view, ChartView::Charts { .. }));
    }

    #[tokio::test]
    async fn failed_download_keeps_previous_charts() {
        let (addr, server) = spawn_server(workbook_bytes());
        let dir = tempfile::tempdir().unwrap();
        let state = DashboardState::new(config_for(addr, dir.path()));

        let before = state.refresh().await;
        assert!(matches!(before.view, ChartView::Charts { .. }));

        // Take the remote down; the next refresh must fail the fetch stage.
        server.abort();
        let _ = server.await;

        let after = state.refresh().await;
        assert!(after.error.starts_with("❌"));
        assert_eq!(after.view, before.view);
    }

    #[tokio::test]
    async fn unparseable_download_degrades_to_placeholder() {
        let (addr, _server) = spawn_server(b"not an xlsx file".to_vec());
        let dir = tempfile::tempdir().unwrap();
        let state = DashboardState::new(config_for(addr, dir.path()));

        let snapshot = state.refresh().await;
        assert!(snapshot.error.starts_with("❌"));
        assert_eq!(
            snapshot.view,
            ChartView::Placeholder {
                message: NO_DATA_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn refresh_is_idempotent_for_an_unchanged_remote() {
        let (addr, _server) = spawn_server(workbook_bytes());
        let dir = tempfile::tempdir().unwrap();
        let state = DashboardState::new(config_for(addr, dir.path()));

        let first = state.refresh().await;
        let second = state.refresh().await;
        assert_eq!(first.view, second.view);
        assert_eq!(first.error, second.error);
    }

    #[tokio::test]
    async fn trigger_while_refreshing_is_a_no_op() {
        let (addr, _server) = spawn_server(workbook_bytes());
        let dir = tempfile::tempdir().unwrap();
        let state = DashboardState::new(config_for(addr, dir.path()));

        state.refreshing.store(true, Ordering::SeqCst);
        let snapshot = state.refresh().await;

        // Nothing ran: no error recorded, initial placeholder still shown.
        assert!(snapshot.refreshing);
        assert!(snapshot.error.is_empty());
        assert!(matches!(snapshot.view, ChartView::Placeholder { .. }));
        assert!(!state.config.workbook_path.exists());
    }

    #[tokio::test]
    async fn completed_refresh_is_broadcast() {
        let (addr, _server) = spawn_server(workbook_bytes());
        let dir = tempfile::tempdir().unwrap();
        let state = DashboardState::new(config_for(addr, dir.path()));

        let mut updates = state.subscribe();
        let snapshot = state.refresh().await;
        let pushed = updates.recv().await.unwrap();
        assert_eq!(pushed, snapshot);
    }
}
