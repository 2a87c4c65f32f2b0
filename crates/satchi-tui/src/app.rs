//! Application state for the satchi terminal client.
//!
//! `App` owns the session store and one state object per screen. Network
//! work either runs on spawned tasks that report back through an mpsc
//! channel (catalog and profile loads) or is queued as a `PendingAction`
//! that the main loop runs right after drawing the "in progress" frame.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use satchi_core::admin::{AdminConsole, AdminIdentity, EventDraft};
use satchi_core::auth::CredentialStore;
use satchi_core::catalog::EventCatalog;
use satchi_core::evaluation::EvaluationConsole;
use satchi_core::fixtures;
use satchi_core::legacy::LegacyConsole;
use satchi_core::models::{parse_mark, EvaluationMark, EventId, EventLevel, EventNode, RoleKind, TeamId, UserProfile};
use satchi_core::profile::Profile;
use satchi_core::registration::{RegistrationForm, SUBMITTING};
use satchi_core::signup::{FieldErrors, SignupError, SignupField, SignupForm, UserType};
use satchi_core::validation::{check_email_domain, ValidationError};
use satchi_core::{ApiClient, Config, SessionStore};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 16;

/// Maximum length for email input (RFC 5321 path limit)
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for any other form field.
const MAX_FIELD_LENGTH: usize = 200;

/// Number of rows to move on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Events,
    Admin,
    Evaluate,
    Legacy,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Events, Tab::Admin, Tab::Evaluate, Tab::Legacy, Tab::Profile];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Events => "Events",
            Tab::Admin => "Admin",
            Tab::Evaluate => "Evaluate",
            Tab::Legacy => "Legacy",
            Tab::Profile => "Profile",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Events => Tab::Admin,
            Tab::Admin => Tab::Evaluate,
            Tab::Evaluate => Tab::Legacy,
            Tab::Legacy => Tab::Profile,
            Tab::Profile => Tab::Events,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Events => Tab::Profile,
            Tab::Admin => Tab::Events,
            Tab::Evaluate => Tab::Admin,
            Tab::Legacy => Tab::Evaluate,
            Tab::Profile => Tab::Legacy,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    LoggingIn,
    SigningUp,
    Registering,
    AdminPrompt,
    EnteringMarks,
    FilteringTeams,
    EditingLegacy,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

/// Editable fields of the registration overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegField {
    Phone,
    TeamName,
    Topic,
    Mentor,
    Member(usize),
}

impl RegField {
    pub fn label(&self) -> String {
        match self {
            RegField::Phone => "Captain phone".to_string(),
            RegField::TeamName => "Team name".to_string(),
            RegField::Topic => "Project topic".to_string(),
            RegField::Mentor => "Faculty mentor".to_string(),
            RegField::Member(i) => format!("Member {} email", i + 1),
        }
    }
}

/// What the admin prompt is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminPromptKind {
    NewEvent { level: EventLevel, parent: Option<EventId> },
    AddRole { id: EventId, kind: RoleKind },
    RemoveRole { id: EventId, kind: RoleKind },
}

#[derive(Debug, Clone)]
pub struct AdminPrompt {
    pub kind: AdminPromptKind,
    pub input: String,
    /// `min-max` for new competitions
    pub team_size: String,
    pub editing_size: bool,
    pub error: Option<String>,
}

impl AdminPrompt {
    fn new(kind: AdminPromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
            team_size: "1-4".to_string(),
            editing_size: false,
            error: None,
        }
    }

    pub fn title(&self) -> String {
        match self.kind {
            AdminPromptKind::NewEvent { level, .. } => format!("New {}", level.label()),
            AdminPromptKind::AddRole { kind, .. } => format!("Add to {}", kind.label()),
            AdminPromptKind::RemoveRole { kind, .. } => format!("Remove from {}", kind.label()),
        }
    }

    pub fn wants_team_size(&self) -> bool {
        matches!(self.kind, AdminPromptKind::NewEvent { level: EventLevel::SubSub, .. })
    }

    /// Cycle the role list for role prompts
    pub fn cycle_role(&mut self) {
        let next = |k: RoleKind| match k {
            RoleKind::Admin => RoleKind::Manager,
            RoleKind::Manager => RoleKind::Coordinator,
            RoleKind::Coordinator => RoleKind::Admin,
        };
        let wants_size = self.wants_team_size();
        match &mut self.kind {
            AdminPromptKind::AddRole { kind, .. } | AdminPromptKind::RemoveRole { kind, .. } => *kind = next(*kind),
            AdminPromptKind::NewEvent { .. } => self.editing_size = !self.editing_size && wants_size,
        }
    }
}

/// Marks being typed for one team on the evaluation tab
#[derive(Debug, Clone)]
pub struct MarksEntry {
    pub team_id: TeamId,
    pub team_name: String,
    /// `[judge name, mark, comments]`
    pub rows: Vec<[String; 3]>,
    pub row: usize,
    pub col: usize,
    pub error: Option<String>,
}

impl MarksEntry {
    pub const COLUMNS: [&'static str; 3] = ["Judge", "Mark", "Comments"];

    fn new(team_id: TeamId, team_name: String, existing: Option<&[EvaluationMark]>) -> Self {
        let rows = match existing {
            Some(marks) if !marks.is_empty() => marks
                .iter()
                .map(|m| [m.judge_name.clone(), m.mark.to_string(), m.comments.clone()])
                .collect(),
            _ => vec![Default::default()],
        };
        Self {
            team_id,
            team_name,
            rows,
            row: 0,
            col: 0,
            error: None,
        }
    }

    pub fn current_mut(&mut self) -> Option<&mut String> {
        self.rows.get_mut(self.row).and_then(|r| r.get_mut(self.col))
    }

    /// Parse the typed rows, skipping blank ones
    pub fn to_marks(&self) -> Result<Vec<EvaluationMark>, ValidationError> {
        self.rows
            .iter()
            .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
            .map(|[judge, mark, comments]| {
                Ok(EvaluationMark::new(judge.trim(), parse_mark(mark)?).with_comments(comments.trim()))
            })
            .collect()
    }
}

/// Which level a legacy selection applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyLevel {
    Main,
    Sub,
    Competition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberPart {
    Name,
    Email,
    Phone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkPart {
    Judge,
    Mark,
    Comments,
}

/// Focusable lines of the legacy tab, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyField {
    Select(LegacyLevel),
    TeamName,
    Topic,
    CaptainName,
    CaptainEmail,
    CaptainPhone,
    Mentor,
    SubmittedAt,
    Member(usize, MemberPart),
    Evaluation,
    Mark(usize, MarkPart),
    Submit,
}

impl LegacyField {
    pub fn is_text(&self) -> bool {
        !matches!(self, LegacyField::Select(_) | LegacyField::Evaluation | LegacyField::Submit)
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned fetch tasks
enum BackgroundResult {
    Events(Vec<EventNode>),
    EventDetail(EventNode),
    Profile(Box<Profile>),
    Error(String),
}

/// Requests that need `&mut` access to a screen; run by the main loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingAction {
    Login,
    Logout,
    Register,
    Signup,
    LegacyLoad,
    LegacySelect(LegacyLevel, EventId),
    LegacySubmit,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    pub session: SessionStore<ApiClient>,
    pub api: ApiClient,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub status_message: Option<String>,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,
    /// Competition to open once the user has logged in
    register_after_login: Option<EventId>,

    // Events tab
    pub catalog: EventCatalog,
    pub events_selection: usize,
    pub events_loading: bool,
    pub registration: Option<RegistrationForm>,
    pub reg_focus: usize,

    // Admin tab
    pub admin: AdminConsole,
    pub admin_selection: usize,
    pub admin_prompt: Option<AdminPrompt>,

    // Evaluate tab
    pub evaluation: EvaluationConsole,
    pub eval_selection: usize,
    pub marks_entry: Option<MarksEntry>,

    // Legacy tab
    pub legacy: LegacyConsole,
    pub legacy_focus: usize,

    // Signup overlay
    pub signup: SignupForm,
    pub signup_focus: usize,
    pub signup_errors: FieldErrors,
    pub signup_status: Option<String>,

    // Profile tab
    pub profile: Option<Profile>,
    pub profile_loading: bool,
    pub profile_selection: usize,

    // Background task channel
    result_rx: mpsc::Receiver<BackgroundResult>,
    result_tx: mpsc::Sender<BackgroundResult>,
    pending: Option<PendingAction>,
}

impl App {
    /// Build the app, restore any saved session and start loading events
    pub async fn new(config: Config) -> Result<Self> {
        let cache_dir = config.cache_dir().unwrap_or_else(|_| std::path::PathBuf::from("./cache"));
        debug!(?cache_dir, api = %config.api_base_url, "Cache directory configured");

        let api = ApiClient::from_config(&config)?;
        let mut session = SessionStore::new(api.clone(), cache_dir);
        let restored = session.hydrate().await;
        debug!(restored, "Session hydrated");

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_email = std::env::var("SATCHI_EMAIL")
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();
        let login_password = std::env::var("SATCHI_PASSWORD")
            .ok()
            .or_else(|| CredentialStore::get_password(&login_email).ok())
            .unwrap_or_default();

        let identity = session
            .user()
            .map(AdminIdentity::from_profile)
            .unwrap_or_else(|| AdminIdentity::new("", false));
        let admin = AdminConsole::from_nodes(identity, &fixtures::admin_events(), &config.email_domain)?;

        let (eval_events, eval_teams) = fixtures::evaluation_hierarchy();

        let mut app = Self {
            config,
            session,
            api,

            state: AppState::Normal,
            current_tab: Tab::Events,
            status_message: None,

            login_email,
            login_password,
            login_focus: LoginFocus::Email,
            login_error: None,
            register_after_login: None,

            catalog: EventCatalog::default(),
            events_selection: 0,
            events_loading: false,
            registration: None,
            reg_focus: 0,

            admin,
            admin_selection: 0,
            admin_prompt: None,

            evaluation: EvaluationConsole::new(eval_events, eval_teams),
            eval_selection: 0,
            marks_entry: None,

            legacy: LegacyConsole::new(),
            legacy_focus: 0,

            signup: SignupForm::new(UserType::Student),
            signup_focus: 0,
            signup_errors: FieldErrors::new(),
            signup_status: None,

            profile: None,
            profile_loading: false,
            profile_selection: 0,

            result_rx: rx,
            result_tx: tx,
            pending: None,
        };
        app.refresh_events();
        Ok(app)
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn can_use_legacy(&self) -> bool {
        LegacyConsole::is_allowed(self.user())
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        match tab {
            Tab::Profile if self.is_authenticated() && self.profile.is_none() && !self.profile_loading => {
                self.refresh_profile();
            }
            Tab::Legacy if self.can_use_legacy() && self.legacy.main_events().is_empty() => {
                self.queue(PendingAction::LegacyLoad);
            }
            _ => {}
        }
    }

    // =========================================================================
    // Pending actions
    // =========================================================================

    fn queue(&mut self, action: PendingAction) {
        self.pending = Some(action);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Run the queued request, if any
    pub async fn run_pending(&mut self) {
        let Some(action) = self.pending.take() else {
            return;
        };
        debug!(?action, "Running pending action");
        match action {
            PendingAction::Login => self.finish_login().await,
            PendingAction::Logout => self.finish_logout().await,
            PendingAction::Register => {
                if let Some(form) = self.registration.as_mut() {
                    let _ = form.submit(&self.api).await;
                }
                self.status_message = None;
            }
            PendingAction::Signup => self.finish_signup().await,
            PendingAction::LegacyLoad => self.legacy.load_main_events(&self.api).await,
            PendingAction::LegacySelect(level, id) => {
                match level {
                    LegacyLevel::Main => self.legacy.select_main(&self.api, id).await,
                    LegacyLevel::Sub => self.legacy.select_sub(&self.api, id).await,
                    LegacyLevel::Competition => self.legacy.select_competition(&self.api, id).await,
                }
                self.clamp_legacy_focus();
            }
            PendingAction::LegacySubmit => {
                let _ = self.legacy.submit(&self.api).await;
                self.status_message = None;
            }
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Show the login overlay
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    pub fn cancel_login(&mut self) {
        self.register_after_login = None;
        self.login_error = None;
        self.state = AppState::Normal;
    }

    pub fn submit_login(&mut self) {
        if self.login_email.trim().is_empty() || self.login_password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return;
        }
        if let Err(e) = check_email_domain(self.login_email.trim(), &self.config.email_domain) {
            self.login_error = Some(e.to_string());
            return;
        }
        self.login_error = Some("Signing in...".to_string());
        self.queue(PendingAction::Login);
    }

    async fn finish_login(&mut self) {
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        let user = match self.session.login(&email, &password).await {
            Ok(identity) => identity.user.clone(),
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.login_error = Some(e.user_message());
                return;
            }
        };

        if let Err(e) = CredentialStore::store(&email, &password) {
            warn!(error = %e, "Failed to store credentials");
        }
        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        self.login_password.clear();
        self.login_error = None;
        self.state = AppState::Normal;
        self.on_identity_changed();
        self.status_message = Some(format!("Logged in as {}", user.display_name()));
        info!("Login successful");

        if let Some(id) = self.register_after_login.take() {
            self.open_registration(id);
        }
    }

    pub fn logout(&mut self) {
        self.status_message = Some("Logging out...".to_string());
        self.queue(PendingAction::Logout);
    }

    async fn finish_logout(&mut self) {
        self.session.logout().await;
        self.on_identity_changed();
        self.status_message = Some("Logged out".to_string());
    }

    /// Reset everything that depends on who is logged in
    fn on_identity_changed(&mut self) {
        let identity = self
            .user()
            .map(AdminIdentity::from_profile)
            .unwrap_or_else(|| AdminIdentity::new("", false));
        self.admin.set_identity(identity);
        self.profile = None;
        self.registration = None;
        self.legacy = LegacyConsole::new();
        self.legacy_focus = 0;
        if self.current_tab == Tab::Profile && self.is_authenticated() {
            self.refresh_profile();
        }
        if self.current_tab == Tab::Legacy && self.can_use_legacy() {
            self.queue(PendingAction::LegacyLoad);
        }
    }

    // =========================================================================
    // Signup
    // =========================================================================

    pub fn start_signup(&mut self) {
        self.state = AppState::SigningUp;
        self.signup_focus = 0;
        self.signup_errors.clear();
        self.signup_status = None;
    }

    /// Fields shown right now; the year only appears when the course has years
    pub fn visible_signup_fields(&self) -> Vec<SignupField> {
        SignupField::for_user_type(self.signup.user_type())
            .iter()
            .copied()
            .filter(|f| *f != SignupField::CurrentYear || !self.signup.options(SignupField::CurrentYear).is_empty())
            .collect()
    }

    pub fn focused_signup_field(&self) -> Option<SignupField> {
        self.visible_signup_fields().get(self.signup_focus).copied()
    }

    pub fn toggle_signup_user_type(&mut self) {
        let next = match self.signup.user_type() {
            UserType::Student => UserType::Faculty,
            UserType::Faculty => UserType::Student,
        };
        self.signup.set_user_type(next);
        self.signup_focus = 0;
        self.signup_errors.clear();
        self.signup_status = None;
    }

    /// Step a choice field through its options
    pub fn cycle_signup_choice(&mut self, forward: bool) {
        let Some(field) = self.focused_signup_field().filter(SignupField::is_choice) else {
            return;
        };
        let options = self.signup.options(field);
        if let Some(next) = cycle_option(&options, self.signup.value(field), forward) {
            self.signup.choose(field, next);
        }
    }

    pub fn submit_signup(&mut self) {
        if let Err(errors) = self.signup.validate(&self.config.email_domain) {
            self.signup_status = Some(format!("Please fix {} field(s)", errors.len()));
            self.signup_errors = errors;
            return;
        }
        self.signup_errors.clear();
        self.signup_status = Some("Creating account...".to_string());
        self.queue(PendingAction::Signup);
    }

    async fn finish_signup(&mut self) {
        let email = self.signup.email.trim().to_lowercase();
        let domain = self.config.email_domain.clone();
        match self.signup.submit(&self.api, &domain).await {
            Ok(_) => {
                self.signup_status = None;
                self.login_email = email;
                self.login_password.clear();
                self.start_login();
                self.login_error = Some("Signup successful! Log in to continue.".to_string());
            }
            Err(SignupError::Invalid(errors)) => {
                self.signup_status = Some(format!("Please fix {} field(s)", errors.len()));
                self.signup_errors = errors;
            }
            Err(SignupError::Api(e)) => {
                self.signup_status = Some(e.user_message());
            }
        }
    }

    // =========================================================================
    // Background loading
    // =========================================================================

    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, result: BackgroundResult) {
        if tx.send(result).await.is_err() {
            debug!("Result channel closed; app is shutting down");
        }
    }

    /// Reload the event catalog in the background
    pub fn refresh_events(&mut self) {
        self.events_loading = true;
        let api = self.api.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = match api.fetch_events().await {
                Ok(events) => BackgroundResult::Events(events),
                Err(e) => BackgroundResult::Error(format!("Failed to load events: {}", e.user_message())),
            };
            Self::send_result(&tx, result).await;
        });
    }

    /// Refetch details for the selected catalog node
    pub fn refresh_selected_event(&mut self) {
        let Some(row) = self.catalog.visible_rows().get(self.events_selection).cloned() else {
            return;
        };
        let api = self.api.clone();
        let tx = self.result_tx.clone();
        self.status_message = Some(format!("Refreshing {}...", row.name));
        tokio::spawn(async move {
            let result = match api.fetch_event_details(row.id).await {
                Ok(node) => BackgroundResult::EventDetail(node),
                Err(e) => BackgroundResult::Error(format!("Failed to refresh {}: {}", row.name, e.user_message())),
            };
            Self::send_result(&tx, result).await;
        });
    }

    pub fn refresh_profile(&mut self) {
        if !self.is_authenticated() {
            return;
        }
        self.profile_loading = true;
        let api = self.api.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = match Profile::load(&api).await {
                Ok(profile) => BackgroundResult::Profile(Box::new(profile)),
                Err(e) => BackgroundResult::Error(format!("Failed to load profile: {}", e.user_message())),
            };
            Self::send_result(&tx, result).await;
        });
    }

    /// Drain finished background results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            self.process_result(result);
        }
    }

    fn process_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Events(events) => {
                info!(count = events.len(), "Events loaded");
                self.catalog = EventCatalog::new(events);
                self.events_loading = false;
                self.events_selection = 0;
            }
            BackgroundResult::EventDetail(node) => {
                let name = node.name.clone();
                if self.catalog.replace_node(node) {
                    self.status_message = Some(format!("Refreshed {}", name));
                }
            }
            BackgroundResult::Profile(profile) => {
                self.profile = Some(*profile);
                self.profile_loading = false;
                self.profile_selection = 0;
            }
            BackgroundResult::Error(message) => {
                warn!(%message, "Background task failed");
                self.events_loading = false;
                self.profile_loading = false;
                self.status_message = Some(message);
            }
        }
    }

    // =========================================================================
    // Events tab
    // =========================================================================

    /// Enter on a catalog row: expand branches, open the form on competitions
    pub fn activate_event_row(&mut self) {
        let Some(row) = self.catalog.visible_rows().get(self.events_selection).cloned() else {
            return;
        };
        if row.level != EventLevel::SubSub {
            self.catalog.toggle_expand(row.id);
            return;
        }
        if !self.is_authenticated() {
            self.register_after_login = Some(row.id);
            self.start_login();
            self.login_error = Some("Log in to register".to_string());
            return;
        }
        self.open_registration(row.id);
    }

    fn open_registration(&mut self, id: EventId) {
        let Some(user) = self.user().cloned() else {
            return;
        };
        match self.catalog.select_leaf(id) {
            Some(target) => {
                self.registration = Some(RegistrationForm::new(target, &user));
                self.reg_focus = 0;
                self.state = AppState::Registering;
            }
            None => self.status_message = Some("Registration is closed for this event".to_string()),
        }
    }

    pub fn registration_fields(&self) -> Vec<RegField> {
        let Some(form) = self.registration.as_ref() else {
            return Vec::new();
        };
        let mut fields = vec![RegField::Phone, RegField::TeamName, RegField::Topic];
        if form.target().faculty_mentor_required {
            fields.push(RegField::Mentor);
        }
        fields.extend((0..form.members().len()).map(RegField::Member));
        fields
    }

    pub fn focused_reg_field(&self) -> Option<RegField> {
        self.registration_fields().get(self.reg_focus).copied()
    }

    pub fn reg_text_mut(&mut self, field: RegField) -> Option<&mut String> {
        let form = self.registration.as_mut()?;
        match field {
            RegField::Phone => Some(&mut form.captain_phone),
            RegField::TeamName => Some(&mut form.team_name),
            RegField::Topic => Some(&mut form.project_topic),
            RegField::Mentor => Some(&mut form.faculty_mentor_name),
            RegField::Member(i) => form.member_mut(i),
        }
    }

    pub fn add_reg_member(&mut self) {
        if let Some(form) = self.registration.as_mut() {
            if form.add_member() {
                self.reg_focus = self.registration_fields().len().saturating_sub(1);
            }
        }
    }

    pub fn remove_reg_member(&mut self) {
        let Some(RegField::Member(i)) = self.focused_reg_field() else {
            return;
        };
        if let Some(form) = self.registration.as_mut() {
            if form.remove_member(i) {
                self.reg_focus = self.reg_focus.saturating_sub(1);
            }
        }
    }

    pub fn submit_registration(&mut self) {
        if self.registration.is_some() {
            self.status_message = Some(SUBMITTING.to_string());
            self.queue(PendingAction::Register);
        }
    }

    pub fn close_registration(&mut self) {
        self.registration = None;
        self.state = AppState::Normal;
    }

    // =========================================================================
    // Admin tab
    // =========================================================================

    pub fn selected_admin_id(&self) -> Option<EventId> {
        self.admin.visible_rows().get(self.admin_selection).map(|r| r.id)
    }

    pub fn open_admin_prompt(&mut self, kind: AdminPromptKind) {
        self.admin_prompt = Some(AdminPrompt::new(kind));
        self.state = AppState::AdminPrompt;
    }

    /// Start creating a child of the selected node, or a main event when
    /// `top_level` is set
    pub fn start_new_event(&mut self, top_level: bool) {
        let kind = if top_level {
            AdminPromptKind::NewEvent {
                level: EventLevel::Main,
                parent: None,
            }
        } else {
            let Some(id) = self.selected_admin_id() else {
                return;
            };
            let Some(level) = self.admin.get(id).and_then(|r| r.level.child()) else {
                self.status_message = Some("Competitions cannot have children".to_string());
                return;
            };
            AdminPromptKind::NewEvent { level, parent: Some(id) }
        };
        self.open_admin_prompt(kind);
    }

    pub fn submit_admin_prompt(&mut self) {
        let Some(prompt) = self.admin_prompt.as_mut() else {
            return;
        };
        let value = prompt.input.trim().to_string();
        let result = match prompt.kind {
            AdminPromptKind::NewEvent { level, parent } => {
                let mut draft = EventDraft::named(value.clone());
                if level == EventLevel::SubSub {
                    match parse_team_size(&prompt.team_size) {
                        Some((min, max)) => {
                            draft.min_members = min;
                            draft.max_members = max;
                        }
                        None => {
                            prompt.error = Some("Team size must look like 2-4".to_string());
                            return;
                        }
                    }
                }
                self.admin
                    .create_event(level, parent, draft)
                    .map(|id| format!("Created {} (#{})", value, id))
            }
            AdminPromptKind::AddRole { id, kind } => self.admin.add_role(id, kind, &value).map(|added| {
                if added {
                    format!("Added {} to {}", value, kind.label())
                } else {
                    format!("{} is already listed", value)
                }
            }),
            AdminPromptKind::RemoveRole { id, kind } => self.admin.remove_role(id, kind, &value).map(|removed| {
                if removed {
                    format!("Removed {} from {}", value, kind.label())
                } else {
                    format!("{} is not listed", value)
                }
            }),
        };

        match result {
            Ok(message) => {
                self.status_message = Some(message);
                self.admin_prompt = None;
                self.state = AppState::Normal;
            }
            Err(e) => {
                if let Some(prompt) = self.admin_prompt.as_mut() {
                    prompt.error = Some(e.to_string());
                }
            }
        }
    }

    pub fn toggle_selected_open(&mut self) {
        let Some(id) = self.selected_admin_id() else {
            return;
        };
        self.status_message = Some(match self.admin.toggle_open(id) {
            Ok(true) => "Registration opened".to_string(),
            Ok(false) => "Registration closed (including everything below)".to_string(),
            Err(e) => e.to_string(),
        });
    }

    pub fn delete_selected_event(&mut self) {
        let Some(id) = self.selected_admin_id() else {
            return;
        };
        self.status_message = Some(match self.admin.delete_event(id) {
            Ok(removed) => format!("Deleted {} event(s)", removed.len()),
            Err(e) => e.to_string(),
        });
        let rows = self.admin.visible_rows().len();
        self.admin_selection = self.admin_selection.min(rows.saturating_sub(1));
    }

    // =========================================================================
    // Evaluate tab
    // =========================================================================

    /// Number of selectable rows at the current drill-down level
    pub fn eval_row_count(&self) -> usize {
        let options = self.evaluation.options().len();
        if options > 0 {
            options
        } else {
            self.evaluation.filtered_teams().len()
        }
    }

    pub fn eval_enter(&mut self) {
        if let Some(option) = self.evaluation.options().get(self.eval_selection) {
            let id = option.id;
            if let Err(e) = self.evaluation.select(id) {
                self.status_message = Some(e.to_string());
            }
            self.eval_selection = 0;
            return;
        }
        let Some(team) = self.evaluation.filtered_teams().get(self.eval_selection).map(|t| (*t).clone()) else {
            return;
        };
        self.marks_entry = Some(MarksEntry::new(team.id, team.name, self.evaluation.marks_for(team.id)));
        self.state = AppState::EnteringMarks;
    }

    pub fn eval_back(&mut self) {
        self.evaluation.back();
        self.eval_selection = 0;
    }

    pub fn save_marks(&mut self) {
        let Some(entry) = self.marks_entry.as_ref() else {
            return;
        };
        let team_id = entry.team_id;
        let team_name = entry.team_name.clone();
        let result = match entry.to_marks() {
            Ok(marks) => self.evaluation.record_marks(team_id, marks).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match result {
            Ok(()) => {
                self.status_message = Some(format!("Saved evaluation for {}", team_name));
                self.marks_entry = None;
                self.state = AppState::Normal;
            }
            Err(message) => {
                if let Some(entry) = self.marks_entry.as_mut() {
                    entry.error = Some(message);
                }
            }
        }
    }

    // =========================================================================
    // Legacy tab
    // =========================================================================

    pub fn legacy_fields(&self) -> Vec<LegacyField> {
        let mut fields = vec![
            LegacyField::Select(LegacyLevel::Main),
            LegacyField::Select(LegacyLevel::Sub),
            LegacyField::Select(LegacyLevel::Competition),
            LegacyField::TeamName,
            LegacyField::Topic,
            LegacyField::CaptainName,
            LegacyField::CaptainEmail,
            LegacyField::CaptainPhone,
            LegacyField::Mentor,
            LegacyField::SubmittedAt,
        ];
        for i in 0..self.legacy.members.len() {
            fields.extend([
                LegacyField::Member(i, MemberPart::Name),
                LegacyField::Member(i, MemberPart::Email),
                LegacyField::Member(i, MemberPart::Phone),
            ]);
        }
        fields.push(LegacyField::Evaluation);
        for i in 0..self.legacy.marks.len() {
            fields.extend([
                LegacyField::Mark(i, MarkPart::Judge),
                LegacyField::Mark(i, MarkPart::Mark),
                LegacyField::Mark(i, MarkPart::Comments),
            ]);
        }
        fields.push(LegacyField::Submit);
        fields
    }

    pub fn focused_legacy_field(&self) -> Option<LegacyField> {
        self.legacy_fields().get(self.legacy_focus).copied()
    }

    fn clamp_legacy_focus(&mut self) {
        let len = self.legacy_fields().len();
        self.legacy_focus = self.legacy_focus.min(len.saturating_sub(1));
    }

    pub fn legacy_text_mut(&mut self, field: LegacyField) -> Option<&mut String> {
        let project = &mut self.legacy.project;
        match field {
            LegacyField::TeamName => Some(&mut project.team_name),
            LegacyField::Topic => Some(&mut project.project_topic),
            LegacyField::CaptainName => Some(&mut project.captain_name),
            LegacyField::CaptainEmail => Some(&mut project.captain_email),
            LegacyField::CaptainPhone => Some(&mut project.captain_phone),
            LegacyField::Mentor => Some(&mut project.faculty_mentor_name),
            LegacyField::SubmittedAt => Some(&mut project.submitted_at),
            LegacyField::Member(i, part) => self.legacy.members.get_mut(i).map(|m| match part {
                MemberPart::Name => &mut m.name,
                MemberPart::Email => &mut m.email,
                MemberPart::Phone => &mut m.phone,
            }),
            LegacyField::Mark(i, part) => self.legacy.marks.get_mut(i).map(|m| match part {
                MarkPart::Judge => &mut m.judge_name,
                MarkPart::Mark => &mut m.mark,
                MarkPart::Comments => &mut m.comments,
            }),
            LegacyField::Select(_) | LegacyField::Evaluation | LegacyField::Submit => None,
        }
    }

    /// Move a hierarchy selection to the previous/next option
    pub fn cycle_legacy_select(&mut self, level: LegacyLevel, forward: bool) {
        let (options, current) = match level {
            LegacyLevel::Main => (self.legacy.main_events(), self.legacy.selected_main()),
            LegacyLevel::Sub => (self.legacy.sub_events(), self.legacy.selected_sub()),
            LegacyLevel::Competition => (self.legacy.competitions(), self.legacy.selected_competition()),
        };
        let ids: Vec<EventId> = options.iter().map(|o| o.id).collect();
        let next = match current.and_then(|c| ids.iter().position(|id| *id == c)) {
            Some(pos) if forward => ids.get((pos + 1) % ids.len()),
            Some(pos) => ids.get((pos + ids.len() - 1) % ids.len()),
            None => ids.first(),
        };
        if let Some(id) = next.copied() {
            self.queue(PendingAction::LegacySelect(level, id));
        }
    }

    /// Enter on a non-text legacy line
    pub fn activate_legacy_field(&mut self) {
        match self.focused_legacy_field() {
            Some(LegacyField::Select(level)) => self.cycle_legacy_select(level, true),
            Some(LegacyField::Evaluation) => {
                let enabled = self.legacy.evaluation_enabled();
                self.legacy.set_evaluation_enabled(!enabled);
                self.clamp_legacy_focus();
            }
            Some(LegacyField::Submit) => {
                self.status_message = Some(satchi_core::legacy::SUBMITTING.to_string());
                self.queue(PendingAction::LegacySubmit);
            }
            Some(_) => self.state = AppState::EditingLegacy,
            None => {}
        }
    }

    /// Add a member row, or a mark row when focus is in the evaluation section
    pub fn add_legacy_row(&mut self) {
        let in_marks = matches!(
            self.focused_legacy_field(),
            Some(LegacyField::Evaluation | LegacyField::Mark(..) | LegacyField::Submit)
        );
        if in_marks {
            self.legacy.add_mark_row();
        } else {
            self.legacy.add_member();
        }
    }

    pub fn remove_legacy_row(&mut self) {
        match self.focused_legacy_field() {
            Some(LegacyField::Member(i, _)) => {
                self.legacy.remove_member(i);
            }
            Some(LegacyField::Mark(i, _)) => {
                self.legacy.remove_mark_row(i);
            }
            _ => return,
        }
        self.clamp_legacy_focus();
    }
}

/// Parse `min-max` (or a single number) as team bounds
pub fn parse_team_size(raw: &str) -> Option<(u32, u32)> {
    let raw = raw.trim();
    match raw.split_once('-') {
        Some((min, max)) => Some((min.trim().parse().ok()?, max.trim().parse().ok()?)),
        None => raw.parse().ok().map(|n| (n, n)),
    }
}

/// Step through `options` from `current`, wrapping; first option when unset
pub fn cycle_option<'a>(options: &'a [String], current: &str, forward: bool) -> Option<&'a str> {
    if options.is_empty() {
        return None;
    }
    let next = match options.iter().position(|o| o == current) {
        Some(pos) if forward => (pos + 1) % options.len(),
        Some(pos) => (pos + options.len() - 1) % options.len(),
        None => 0,
    };
    options.get(next).map(String::as_str)
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

pub fn can_add_field_char(current_len: usize, c: char) -> bool {
    current_len < MAX_FIELD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_next_prev_wrap() {
        for tab in Tab::ALL {
            assert_eq!(tab.next().prev(), tab);
        }
        assert_eq!(Tab::Profile.next(), Tab::Events);
        assert_eq!(Tab::Events.prev(), Tab::Profile);
    }

    #[test]
    fn test_parse_team_size() {
        assert_eq!(parse_team_size("2-4"), Some((2, 4)));
        assert_eq!(parse_team_size(" 3 "), Some((3, 3)));
        assert_eq!(parse_team_size("a-4"), None);
        assert_eq!(parse_team_size(""), None);
    }

    #[test]
    fn test_cycle_option() {
        let options: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        assert_eq!(cycle_option(&options, "", true), Some("A"));
        assert_eq!(cycle_option(&options, "C", true), Some("A"));
        assert_eq!(cycle_option(&options, "A", false), Some("C"));
        assert_eq!(cycle_option(&[], "A", true), None);
    }

    #[test]
    fn test_marks_entry_skips_blank_rows() {
        let mut entry = MarksEntry::new(1, "Byte Busters".into(), None);
        entry.rows = vec![
            ["Dr. Rao".into(), "8".into(), "".into()],
            Default::default(),
            ["Dr. Iyer".into(), " 7.5 ".into(), "Clean demo".into()],
        ];
        let marks = entry.to_marks().unwrap();
        assert_eq!(marks.len(), 2);
        assert_eq!(marks[1].mark, 7.5);
        assert_eq!(marks[1].comments, "Clean demo");

        entry.rows[0][1] = "eight".into();
        assert!(entry.to_marks().is_err());
    }

    #[test]
    fn test_prompt_cycles_role_kind() {
        let mut prompt = AdminPrompt::new(AdminPromptKind::AddRole {
            id: 1,
            kind: RoleKind::Admin,
        });
        prompt.cycle_role();
        assert_eq!(
            prompt.kind,
            AdminPromptKind::AddRole {
                id: 1,
                kind: RoleKind::Manager
            }
        );
        assert!(!prompt.wants_team_size());
    }

    #[test]
    fn test_input_char_limits() {
        assert!(can_add_email_char(0, 'a'));
        assert!(!can_add_email_char(0, ' '));
        assert!(!can_add_email_char(MAX_EMAIL_LENGTH, 'a'));
        assert!(can_add_password_char(0, ' '));
        assert!(!can_add_password_char(0, '\n'));
        assert!(!can_add_field_char(MAX_FIELD_LENGTH, 'x'));
    }
}
