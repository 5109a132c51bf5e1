//! Application state for the terminal client.
//!
//! [`App`] is the single orchestrator: it owns the view model (indicators,
//! page views, notifications) and is only ever mutated from the UI loop.
//! Network work runs on tokio tasks created through [`AppContext`]; every
//! task reports back as a [`ClientEvent`] over one channel, so nothing the
//! background does can touch the view model directly.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use crate::client::browser;
use crate::client::notify::{NotificationId, NotificationKind};
use crate::client::refresh::fetch_page;
use crate::client::status::spawn_status_poller;
use crate::client::{
    ApiTransport, NotificationSurface, Page, PageData, PageViews, PreferenceStore, Region,
    RegionSequencer, StatusIndicators, StatusSnapshot, ThemePreference,
};
use crate::error::Result;
use crate::ui::Theme;

/// How long the "Refreshing…" notice stays up if the request is slow.
const REFRESHING_DURATION: Duration = Duration::from_millis(1000);

/// The about link stays up longer so it can be copied.
const ABOUT_DURATION: Duration = Duration::from_millis(8000);

/// Something a background task finished.
#[derive(Debug)]
pub enum ClientEvent {
    Status {
        seq: u64,
        result: Result<StatusSnapshot>,
    },
    Page {
        page: Page,
        seq: u64,
        result: Result<PageData>,
    },
    /// A control action such as unbinding a player.
    Action {
        label: String,
        refresh: Option<Page>,
        result: Result<Value>,
    },
    /// A task returned an error nobody handled, or panicked.
    TaskFailed(String),
}

/// Handles shared by everything that issues requests.
#[derive(Clone)]
pub struct AppContext {
    pub api: Arc<dyn ApiTransport>,
    pub sequencer: Arc<RegionSequencer>,
    events: UnboundedSender<ClientEvent>,
}

impl AppContext {
    pub fn new(api: Arc<dyn ApiTransport>) -> (Self, UnboundedReceiver<ClientEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let ctx = Self {
            api,
            sequencer: Arc::new(RegionSequencer::new()),
            events,
        };
        (ctx, rx)
    }

    /// Run `task` in the background and deliver the event it produces.
    ///
    /// An `Err` or a panic becomes [`ClientEvent::TaskFailed`], so no
    /// failure is silently dropped. Must be called inside a tokio runtime.
    pub fn spawn_guarded<F>(&self, task: F)
    where
        F: Future<Output = Result<ClientEvent>> + Send + 'static,
    {
        let events = self.events.clone();
        let handle = tokio::spawn(task);
        tokio::spawn(async move {
            let event = match handle.await {
                Ok(Ok(event)) => event,
                Ok(Err(e)) => ClientEvent::TaskFailed(e.to_string()),
                Err(join_error) => ClientEvent::TaskFailed(join_error.to_string()),
            };
            // Receiver gone means the app is shutting down
            let _ = events.send(event);
        });
    }

    /// Start the status poller under the same supervision as
    /// [`spawn_guarded`](Self::spawn_guarded): if it panics, the app hears
    /// about it as [`ClientEvent::TaskFailed`].
    pub fn start_status_poller(&self, interval: Duration) -> AbortHandle {
        let poller = spawn_status_poller(
            self.api.clone(),
            self.sequencer.clone(),
            self.events.clone(),
            interval,
        );
        let abort = poller.abort_handle();
        let events = self.events.clone();
        tokio::spawn(async move {
            if let Err(join_error) = poller.await {
                if join_error.is_panic() {
                    let _ = events.send(ClientEvent::TaskFailed(format!(
                        "status poller stopped: {}",
                        join_error
                    )));
                }
            }
        });
        abort
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub page: Page,

    // View model
    pub notifications: NotificationSurface,
    pub indicators: StatusIndicators,
    pub last_status_at: Option<Instant>,
    pub views: PageViews,
    pub selected_index: usize,

    // UI
    pub theme: Theme,
    pub server_label: String,

    ctx: AppContext,
    events: UnboundedReceiver<ClientEvent>,
    prefs: PreferenceStore,
    about_url: String,
    refreshing: Vec<(Page, NotificationId)>,
}

/// The saved theme, or the terminal's guess when nothing is saved.
pub fn resolve_theme(prefs: &PreferenceStore) -> ThemePreference {
    prefs.theme().unwrap_or_else(Theme::detect_preference)
}

impl App {
    pub fn new(
        ctx: AppContext,
        events: UnboundedReceiver<ClientEvent>,
        prefs: PreferenceStore,
        theme: ThemePreference,
        about_url: impl Into<String>,
    ) -> Self {
        Self {
            running: true,
            show_help: false,
            page: Page::Dashboard,
            notifications: NotificationSurface::new(),
            indicators: StatusIndicators::new(),
            last_status_at: None,
            views: PageViews::default(),
            selected_index: 0,
            theme: Theme::for_preference(theme),
            server_label: String::new(),
            ctx,
            events,
            prefs,
            about_url: about_url.into(),
            refreshing: Vec::new(),
        }
    }

    pub fn with_server_label(mut self, label: impl Into<String>) -> Self {
        self.server_label = label.into();
        self
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn about_url(&self) -> &str {
        &self.about_url
    }

    /// Refresh whatever page is showing.
    pub fn refresh(&mut self) {
        self.refresh_page(self.page);
    }

    /// Refresh the page at `path`. Unknown paths do nothing.
    pub fn refresh_path(&mut self, path: &str) -> bool {
        match Page::from_path(path) {
            Some(page) => {
                self.refresh_page(page);
                true
            }
            None => {
                debug!(path, "No refresh routine for path");
                false
            }
        }
    }

    /// Start the single request that feeds `page`.
    pub fn refresh_page(&mut self, page: Page) {
        let seq = self.ctx.sequencer.issue(Region::Page(page));
        let notice =
            self.notifications
                .show("Refreshing…", NotificationKind::Info, REFRESHING_DURATION);
        self.refreshing.push((page, notice));
        debug!(page = page.label(), seq, "Refreshing page");

        let api = self.ctx.api.clone();
        self.ctx.spawn_guarded(async move {
            let result = fetch_page(api.as_ref(), page).await;
            Ok(ClientEvent::Page { page, seq, result })
        });
    }

    pub fn set_page(&mut self, page: Page) {
        if self.page != page {
            self.page = page;
            self.selected_index = 0;
        }
        self.refresh();
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page.next());
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.prev());
    }

    /// Flip the theme and persist the new value.
    pub fn toggle_theme(&mut self) {
        let next = self.theme.preference.toggled();
        self.theme = Theme::for_preference(next);
        if let Err(e) = self.prefs.save_theme(next) {
            warn!(error = %e, "Failed to save theme preference");
            self.notifications.warning(format!("Theme not saved: {}", e));
        }
    }

    /// Open the project page in the system browser.
    pub fn open_about(&mut self) {
        match browser::open_url(&self.about_url) {
            Ok(()) => info!(url = %self.about_url, "Opened about page"),
            Err(e) => {
                warn!(error = %e, url = %self.about_url, "Could not open browser");
                let message = format!("About: {}", self.about_url);
                self.notifications.show(message, NotificationKind::Info, ABOUT_DURATION);
            }
        }
    }

    /// The user row under the cursor on the Users page.
    pub fn selected_user(&self) -> Option<&crate::bridge::UserInfo> {
        if self.page != Page::Users {
            return None;
        }
        self.views.users.as_ref()?.users.get(self.selected_index)
    }

    /// Ask the server to unbind the selected player.
    pub fn unbind_selected(&mut self) {
        let Some(user) = self.selected_user() else {
            return;
        };
        if !user.is_bound {
            let message = format!("{} has no QQ binding", user.player_name);
            self.notifications.warning(message);
            return;
        }

        let player = user.player_name.clone();
        let api = self.ctx.api.clone();
        info!(player = %player, "Requesting unbind");
        self.ctx.spawn_guarded(async move {
            let endpoint = format!("/api/users/{}/unbind", player);
            let result = api.post(&endpoint, None).await;
            Ok(ClientEvent::Action {
                label: format!("Unbind {}", player),
                refresh: Some(Page::Users),
                result,
            })
        });
    }

    pub fn dismiss_newest_notification(&mut self) {
        self.notifications.dismiss_newest();
    }

    /// Number of selectable rows on the current page.
    fn row_count(&self) -> usize {
        match self.page {
            Page::Dashboard => self
                .views
                .dashboard
                .as_ref()
                .map_or(0, |v| v.recent_messages.len()),
            Page::Config => self.views.config.as_ref().map_or(0, |v| v.entries.len()),
            Page::Users => self.views.users.as_ref().map_or(0, |v| v.users.len()),
            Page::Logs => self.views.logs.as_ref().map_or(0, |v| v.logs.len()),
        }
    }

    pub fn select_next(&mut self) {
        let max = self.row_count().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max);
    }

    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Select `row` if it exists on the current page.
    pub fn select_row(&mut self, row: usize) {
        if row < self.row_count() {
            self.selected_index = row;
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.row_count().saturating_sub(1);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn start_status_poller(&self, interval: Duration) -> AbortHandle {
        self.ctx.start_status_poller(interval)
    }

    fn finish_refreshing(&mut self, page: Page) {
        let (done, rest): (Vec<_>, Vec<_>) =
            self.refreshing.drain(..).partition(|(p, _)| *p == page);
        self.refreshing = rest;
        for (_, id) in done {
            self.notifications.dismiss(id);
        }
    }

    /// Apply one finished background result to the view model.
    pub fn handle_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Status { seq, result } => {
                if !self.ctx.sequencer.is_current(Region::Status, seq) {
                    debug!(seq, "Discarding stale status response");
                    return;
                }
                match result {
                    Ok(snapshot) => {
                        let updated = self.indicators.apply(&snapshot);
                        self.last_status_at = Some(Instant::now());
                        debug!(updated, "Status indicators updated");
                    }
                    Err(e) => {
                        warn!(error = %e, "Status check failed");
                        self.notifications.error("Cannot reach server");
                    }
                }
            }
            ClientEvent::Page { page, seq, result } => {
                if !self.ctx.sequencer.is_current(Region::Page(page), seq) {
                    debug!(page = page.label(), seq, "Discarding stale page response");
                    return;
                }
                self.finish_refreshing(page);
                match result {
                    Ok(data) => {
                        self.views.apply(data);
                        if page == self.page {
                            let max = self.row_count().saturating_sub(1);
                            self.selected_index = self.selected_index.min(max);
                        }
                        self.notifications.success("Refreshed");
                    }
                    Err(e) => {
                        warn!(page = page.label(), error = %e, "Refresh failed");
                        self.notifications.error(format!("Refresh failed: {}", e));
                    }
                }
            }
            ClientEvent::Action {
                label,
                refresh,
                result,
            } => match result {
                Ok(body) => {
                    let message = body
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("{} done", label));
                    info!(action = %label, "Action succeeded");
                    self.notifications.success(message);
                    if let Some(page) = refresh {
                        self.refresh_page(page);
                    }
                }
                Err(e) => {
                    warn!(action = %label, error = %e, "Action failed");
                    self.notifications.error(format!("{} failed: {}", label, e));
                }
            },
            ClientEvent::TaskFailed(reason) => {
                error!(reason = %reason, "Background task failed");
                self.notifications.error("Network request failed");
            }
        }
    }

    /// Apply every event that has already arrived. Never blocks.
    pub fn drain_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Wait for the next event and apply it.
    ///
    /// Returns `false` once every sender is gone.
    pub async fn next_event(&mut self) -> bool {
        match self.events.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Advance notification phases. Called after each drawn frame.
    pub fn tick(&mut self, now: Instant) {
        self.notifications.tick(now);
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::refresh::UsersView;
    use crate::client::RequestOptions;
    use crate::error::WebUiError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use tempfile::TempDir;

    /// Records every request and answers from a fixed table.
    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<(String, String)>>,
        failing: Vec<&'static str>,
    }

    impl FakeApi {
        fn failing(endpoints: &[&'static str]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing: endpoints.to_vec(),
            }
        }

        fn endpoints(&self) -> Vec<String> {
            self.calls.lock().iter().map(|(_, e)| e.clone()).collect()
        }
    }

    #[async_trait]
    impl ApiTransport for FakeApi {
        async fn call(&self, endpoint: &str, options: RequestOptions) -> Result<Value> {
            self.calls
                .lock()
                .push((options.method.to_string(), endpoint.to_string()));
            if self.failing.contains(&endpoint) {
                return Err(WebUiError::Request {
                    status: 500,
                    status_text: "Internal Server Error".to_string(),
                });
            }
            Ok(match endpoint {
                "/api/dashboard" => json!({
                    "stats": { "online_players": 1 },
                    "recent_messages": [
                        { "sender": "Steve", "content": "<script>x</script>", "time": "10:00:00" }
                    ],
                }),
                "/api/users" => json!({ "users": [user_json("Steve", "12345")] }),
                "/api/logs" => json!({ "logs": [] }),
                "/api/config" => json!({ "force_bind_qq": true }),
                "/api/users/Steve/unbind" => json!({ "success": true, "message": "Unbound Steve" }),
                _ => json!({}),
            })
        }
    }

    fn user_json(name: &str, qq: &str) -> Value {
        json!({
            "player_name": name, "name": name, "qq_number": qq, "xuid": "",
            "is_online": false, "bind_time": null, "unbind_time": null,
            "rebind_time": null, "unbind_by": "", "unbind_reason": "",
            "original_qq": "", "total_playtime": 0, "session_count": 0,
            "last_join_time": null, "last_quit_time": null, "is_banned": false,
            "ban_time": null, "ban_by": "", "ban_reason": "", "unban_time": null,
            "unban_by": "", "is_bound": !qq.is_empty(),
            "binding_status": if qq.is_empty() { "never_bound" } else { "bound" },
        })
    }

    fn app_with(api: Arc<FakeApi>) -> App {
        let (ctx, rx) = AppContext::new(api);
        App::new(
            ctx,
            rx,
            PreferenceStore::disabled(),
            ThemePreference::Dark,
            "https://example.invalid/about",
        )
    }

    fn count_kind(app: &App, kind: NotificationKind) -> usize {
        app.notifications.iter().filter(|n| n.kind == kind).count()
    }

    #[tokio::test]
    async fn test_refresh_is_path_exclusive() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api.clone());

        assert!(app.refresh_path("/users"));
        assert!(app.next_event().await);

        assert_eq!(api.endpoints(), vec!["/api/users".to_string()]);
        assert!(app.views.users.is_some());
        assert!(app.views.dashboard.is_none());
        assert!(app.views.config.is_none());
    }

    #[tokio::test]
    async fn test_unknown_path_is_noop() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api.clone());

        assert!(!app.refresh_path("/nowhere"));
        assert!(app.notifications.is_empty());
        assert!(api.endpoints().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_success_replaces_refreshing_notice() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api);

        app.refresh();
        assert_eq!(app.notifications.iter().next().unwrap().message, "Refreshing…");
        app.next_event().await;

        let messages: Vec<_> = app.notifications.iter().map(|n| n.message.clone()).collect();
        assert_eq!(messages, vec!["Refreshed".to_string()]);
        let dashboard = app.views.dashboard.as_ref().unwrap();
        assert_eq!(dashboard.recent_messages[0].content, "<script>x</script>");
    }

    #[tokio::test]
    async fn test_failed_refresh_one_error_and_no_update() {
        let api = Arc::new(FakeApi::failing(&["/api/dashboard"]));
        let mut app = app_with(api);

        app.refresh();
        app.next_event().await;

        assert_eq!(count_kind(&app, NotificationKind::Error), 1);
        assert_eq!(app.notifications.len(), 1);
        assert!(app.views.dashboard.is_none());
        assert!(app.running);
    }

    #[tokio::test]
    async fn test_stale_page_response_is_discarded() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api);

        let stale = app.ctx.sequencer.issue(Region::Page(Page::Users));
        let _latest = app.ctx.sequencer.issue(Region::Page(Page::Users));
        app.handle_event(ClientEvent::Page {
            page: Page::Users,
            seq: stale,
            result: Ok(PageData::Users(UsersView::default())),
        });

        assert!(app.views.users.is_none());
        assert!(app.notifications.is_empty());
    }

    #[tokio::test]
    async fn test_status_failure_keeps_indicators() {
        use crate::client::status::IndicatorState;
        use crate::client::StatusKey;

        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api);

        let seq = app.ctx.sequencer.issue(Region::Status);
        let snapshot = match json!({ "plugin_enabled": true }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        app.handle_event(ClientEvent::Status {
            seq,
            result: Ok(snapshot),
        });

        let seq = app.ctx.sequencer.issue(Region::Status);
        app.handle_event(ClientEvent::Status {
            seq,
            result: Err(WebUiError::Connection("refused".to_string())),
        });

        assert_eq!(
            app.indicators.get(StatusKey::PluginEnabled).state,
            IndicatorState::Normal
        );
        assert_eq!(count_kind(&app, NotificationKind::Error), 1);
        assert_eq!(
            app.notifications.iter().next().unwrap().message,
            "Cannot reach server"
        );
    }

    #[tokio::test]
    async fn test_status_poller_runs_immediately() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api.clone());

        let poller = app.start_status_poller(Duration::from_secs(3600));
        assert!(app.next_event().await);
        poller.abort();

        assert_eq!(api.endpoints(), vec!["/api/status".to_string()]);
        assert!(app.last_status_at.is_some());
    }

    /// Fails the first `failures` status checks, then reports a healthy
    /// plugin. Remembers when each check happened.
    struct FlakyStatus {
        failures: usize,
        polled_at: Mutex<Vec<tokio::time::Instant>>,
    }

    impl FlakyStatus {
        fn new(failures: usize) -> Self {
            Self {
                failures,
                polled_at: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ApiTransport for FlakyStatus {
        async fn call(&self, _endpoint: &str, _options: RequestOptions) -> Result<Value> {
            let attempt = {
                let mut polled = self.polled_at.lock();
                polled.push(tokio::time::Instant::now());
                polled.len()
            };
            if attempt <= self.failures {
                return Err(WebUiError::Connection("refused".to_string()));
            }
            Ok(json!({ "plugin_enabled": true, "online_players": 2 }))
        }
    }

    struct PanickingApi;

    #[async_trait]
    impl ApiTransport for PanickingApi {
        async fn call(&self, _endpoint: &str, _options: RequestOptions) -> Result<Value> {
            panic!("transport exploded")
        }
    }

    fn app_on(api: Arc<dyn ApiTransport>) -> App {
        let (ctx, rx) = AppContext::new(api);
        App::new(ctx, rx, PreferenceStore::disabled(), ThemePreference::Dark, "")
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_poller_keeps_interval_through_failures() {
        use crate::client::status::IndicatorState;
        use crate::client::StatusKey;

        let api = Arc::new(FlakyStatus::new(1));
        let mut app = app_on(api.clone());
        let interval = Duration::from_secs(30);
        let poller = app.start_status_poller(interval);

        assert!(app.next_event().await);
        assert_eq!(count_kind(&app, NotificationKind::Error), 1);
        assert_eq!(
            app.indicators.get(StatusKey::PluginEnabled).state,
            IndicatorState::Unknown
        );

        tokio::time::advance(interval).await;
        assert!(app.next_event().await);
        poller.abort();

        let polled = api.polled_at.lock().clone();
        assert_eq!(polled.len(), 2);
        assert_eq!(polled[1] - polled[0], interval);
        assert_eq!(count_kind(&app, NotificationKind::Error), 1);
        assert_eq!(
            app.indicators.get(StatusKey::PluginEnabled).state,
            IndicatorState::Normal
        );
        assert_eq!(app.indicators.get(StatusKey::OnlinePlayers).to_string(), "2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_poll_interval_still_polls() {
        use crate::client::status::MIN_POLL_INTERVAL;

        let api = Arc::new(FlakyStatus::new(0));
        let mut app = app_on(api.clone());
        let poller = app.start_status_poller(Duration::ZERO);

        assert!(app.next_event().await);
        assert!(app.next_event().await);
        poller.abort();

        let polled = api.polled_at.lock().clone();
        assert_eq!(polled[1] - polled[0], MIN_POLL_INTERVAL);
        assert!(app.notifications.is_empty());
    }

    #[tokio::test]
    async fn test_status_poller_panic_surfaces_notification() {
        let mut app = app_on(Arc::new(PanickingApi));
        app.start_status_poller(Duration::from_secs(30));

        assert!(app.next_event().await);
        assert_eq!(count_kind(&app, NotificationKind::Error), 1);
        assert_eq!(
            app.notifications.iter().next().unwrap().message,
            "Network request failed"
        );
    }

    #[tokio::test]
    async fn test_unhandled_task_error_surfaces_notification() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api);

        app.ctx.spawn_guarded(async { Err(WebUiError::Timeout) });
        app.next_event().await;

        assert_eq!(count_kind(&app, NotificationKind::Error), 1);
        assert_eq!(
            app.notifications.iter().next().unwrap().message,
            "Network request failed"
        );
    }

    #[tokio::test]
    async fn test_panicking_task_surfaces_notification() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api);

        app.ctx.spawn_guarded(async { panic!("boom") });
        app.next_event().await;

        assert_eq!(count_kind(&app, NotificationKind::Error), 1);
    }

    #[tokio::test]
    async fn test_unbind_selected_posts_and_refreshes_users() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api.clone());

        app.set_page(Page::Users);
        app.next_event().await;
        app.unbind_selected();
        // Action result, then the users refresh it triggers
        app.next_event().await;
        app.next_event().await;

        let calls = api.calls.lock().clone();
        assert_eq!(
            calls[1],
            ("POST".to_string(), "/api/users/Steve/unbind".to_string())
        );
        assert_eq!(calls[2].1, "/api/users");
        assert!(app
            .notifications
            .iter()
            .any(|n| n.message == "Unbound Steve" && n.kind == NotificationKind::Success));
    }

    #[tokio::test]
    async fn test_unbind_requires_users_page() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api.clone());

        app.unbind_selected();
        assert!(api.endpoints().is_empty());
    }

    #[tokio::test]
    async fn test_theme_double_toggle() {
        let dir = TempDir::new().unwrap();
        let prefs = PreferenceStore::new(dir.path().join("prefs.json"));
        prefs.save_theme(ThemePreference::Light).unwrap();

        let api: Arc<FakeApi> = Arc::new(FakeApi::default());
        let (ctx, rx) = AppContext::new(api);
        let mut app = App::new(ctx, rx, prefs.clone(), resolve_theme(&prefs), "");
        assert_eq!(app.theme.preference, ThemePreference::Light);

        app.toggle_theme();
        assert_eq!(prefs.theme(), Some(ThemePreference::Dark));
        app.toggle_theme();
        assert_eq!(prefs.theme(), Some(ThemePreference::Light));
        assert_eq!(app.theme.preference, ThemePreference::Light);
    }

    #[tokio::test]
    async fn test_switching_page_refreshes_and_resets_selection() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api.clone());

        app.selected_index = 3;
        app.next_page();
        assert_eq!(app.page, Page::Config);
        assert_eq!(app.selected_index, 0);
        app.next_event().await;
        assert_eq!(api.endpoints(), vec!["/api/config".to_string()]);
    }
}
