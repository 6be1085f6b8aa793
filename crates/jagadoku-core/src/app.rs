//! Application state: ledger, session, persistence and network actions
//!
//! `AppContext` is the single writer. Every mutation is saved before the call
//! returns. Network actions run in three steps so a server can release its
//! lock during I/O:
//!
//! 1. `begin_*` checks preconditions, claims the busy flag and snapshots state
//! 2. the returned job runs against the remote service without the context
//! 3. `finish_*` applies the outcome and queues the user notification
//!
//! The CLI uses the one-shot wrappers (`login`, `sync`, `advise`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::aggregation::{self, Dashboard};
use crate::ai::{AIBackend, AIInsight};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::goals::parse_contribution;
use crate::identity::IdentityProvider;
use crate::ledger::{Ledger, LedgerSnapshot};
use crate::models::{NewSavingsGoal, NewTransaction, SavingsGoal, Transaction, UserSession};
use crate::notifications::{messages, Notification, NotificationKind, Notifications};
use crate::sync::{ensure_spreadsheet, sync_ledger, SpreadsheetBackend, SyncReport};

/// Rejects a second trigger of the same network action while one is pending
#[derive(Debug, Clone, Default)]
pub struct BusyFlag {
    busy: Arc<AtomicBool>,
}

/// Holds a `BusyFlag` until dropped
#[derive(Debug)]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flag, or fail with `Error::Busy` naming `what`
    pub fn try_acquire(&self, what: &str) -> Result<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy(what.to_string()))?;
        Ok(BusyGuard {
            busy: self.busy.clone(),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Result of authenticating a token, before it is applied to the context
#[derive(Debug)]
pub struct LoginOutcome {
    pub session: UserSession,
    /// Provisioning a spreadsheet was attempted and failed
    pub spreadsheet_failed: bool,
}

/// Resolve a token to a session and make sure it has a spreadsheet.
///
/// Profile failure is fatal (`Error::Auth`). Spreadsheet creation failure is
/// not: the session is returned without a spreadsheet id.
pub async fn authenticate<I, S>(
    access_token: &str,
    identity: &I,
    sheets: &S,
    existing_spreadsheet: Option<String>,
) -> Result<LoginOutcome>
where
    I: IdentityProvider + ?Sized,
    S: SpreadsheetBackend + ?Sized,
{
    let profile = identity.fetch_profile(access_token).await?;

    let (spreadsheet_id, spreadsheet_failed) =
        match ensure_spreadsheet(sheets, access_token, existing_spreadsheet.as_deref()).await {
            Ok(id) => (Some(id), false),
            Err(e) => {
                warn!(error = %e, "Continuing login without a spreadsheet");
                (None, true)
            }
        };

    Ok(LoginOutcome {
        session: UserSession::from_profile(profile, access_token, spreadsheet_id),
        spreadsheet_failed,
    })
}

/// The signed-in account a sync was started for
#[derive(Debug, Clone, PartialEq, Eq)]
struct SyncOwner {
    email: String,
    token: String,
}

impl SyncOwner {
    fn matches(&self, session: &UserSession) -> bool {
        !session.is_guest && session.email == self.email && session.access_token == self.token
    }
}

/// A claimed sync, detached from the context
#[derive(Debug)]
pub struct SyncJob {
    owner: SyncOwner,
    spreadsheet_id: Option<String>,
    snapshot: LedgerSnapshot,
    guard: BusyGuard,
}

/// What a sync job produced; hand it back to `finish_sync`
#[derive(Debug)]
pub struct SyncOutcome {
    owner: SyncOwner,
    result: Result<(String, SyncReport)>,
    _guard: BusyGuard,
}

impl SyncJob {
    /// Provision the spreadsheet if needed, then overwrite both regions
    pub async fn run<S: SpreadsheetBackend + ?Sized>(self, sheets: &S) -> SyncOutcome {
        let result: Result<(String, SyncReport)> = async {
            let token = &self.owner.token;
            let id = ensure_spreadsheet(sheets, token, self.spreadsheet_id.as_deref()).await?;
            let report = sync_ledger(sheets, token, &id, &self.snapshot).await?;
            Ok((id, report))
        }
        .await;

        SyncOutcome {
            owner: self.owner,
            result,
            _guard: self.guard,
        }
    }
}

/// A claimed advice request, detached from the context
#[derive(Debug)]
pub struct AdviceJob {
    snapshot: LedgerSnapshot,
    guard: BusyGuard,
}

#[derive(Debug)]
pub struct AdviceOutcome {
    result: Result<AIInsight>,
    _guard: BusyGuard,
}

impl AdviceJob {
    pub async fn run<A: AIBackend + ?Sized>(self, ai: &A) -> AdviceOutcome {
        debug!(model = ai.model(), host = ai.host(), "Requesting advice");
        AdviceOutcome {
            result: ai.financial_advice(&self.snapshot).await,
            _guard: self.guard,
        }
    }
}

pub struct AppContext {
    db: Database,
    ledger: Ledger,
    session: Option<UserSession>,
    notifications: Notifications,
    sync_busy: BusyFlag,
    advice_busy: BusyFlag,
}

impl AppContext {
    /// Load persisted state from `db`
    pub fn open(db: Database) -> Result<Self> {
        let transactions = db.load_transactions()?;
        let goals = db.load_goals()?;
        let session = db.load_user()?;
        info!(
            transactions = transactions.len(),
            goals = goals.len(),
            logged_in = session.is_some(),
            "Loaded local state"
        );

        Ok(Self {
            db,
            ledger: Ledger::from_parts(transactions, goals),
            session,
            notifications: Notifications::new(),
            sync_busy: BusyFlag::new(),
            advice_busy: BusyFlag::new(),
        })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.transactions()
    }

    pub fn goals(&self) -> &[SavingsGoal] {
        self.ledger.goals()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    pub fn session(&self) -> Option<&UserSession> {
        self.session.as_ref()
    }

    pub fn dashboard(&self, date: Option<NaiveDate>) -> Dashboard {
        aggregation::dashboard(self.ledger.transactions(), date)
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.pending()
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    pub fn is_syncing(&self) -> bool {
        self.sync_busy.is_busy()
    }

    pub fn is_advising(&self) -> bool {
        self.advice_busy.is_busy()
    }

    // ── Ledger ───────────────────────────────────────────────────────────────

    /// Run `change` on a copy of the ledger and keep it only once it is saved
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut Ledger) -> Result<T>,
        save: impl FnOnce(&Database, &Ledger) -> Result<()>,
    ) -> Result<T> {
        let mut next = self.ledger.clone();
        let value = change(&mut next)?;
        save(&self.db, &next)?;
        self.ledger = next;
        Ok(value)
    }

    /// Add a transaction. Incomplete input is ignored and returns `Ok(None)`.
    pub fn add_transaction(&mut self, input: NewTransaction) -> Result<Option<Transaction>> {
        let Some(tx) = Transaction::create(input) else {
            debug!("Ignoring incomplete transaction input");
            return Ok(None);
        };
        self.commit(
            |ledger| ledger.insert_transaction(tx.clone()),
            |db, ledger| db.save_transactions(ledger.transactions()),
        )?;
        Ok(Some(tx))
    }

    /// Delete by id. Unknown ids are a no-op returning false.
    pub fn delete_transaction(&mut self, id: &str) -> Result<bool> {
        if !self.ledger.transactions().iter().any(|t| t.id == id) {
            return Ok(false);
        }
        self.commit(
            |ledger| Ok(ledger.remove_transaction(id)),
            |db, ledger| db.save_transactions(ledger.transactions()),
        )
    }

    pub fn add_goal(&mut self, input: NewSavingsGoal) -> Result<Option<SavingsGoal>> {
        let Some(goal) = SavingsGoal::create(input) else {
            debug!("Ignoring incomplete goal input");
            return Ok(None);
        };
        self.commit(
            |ledger| ledger.insert_goal(goal.clone()),
            |db, ledger| db.save_goals(ledger.goals()),
        )?;
        Ok(Some(goal))
    }

    pub fn contribute_to_goal(&mut self, id: &str, delta: f64) -> Result<SavingsGoal> {
        self.commit(
            |ledger| ledger.contribute_to_goal(id, delta),
            |db, ledger| db.save_goals(ledger.goals()),
        )
    }

    /// Contribute an amount typed by the user; unparseable input returns `Ok(None)`
    pub fn contribute_input(&mut self, id: &str, input: &str) -> Result<Option<SavingsGoal>> {
        match parse_contribution(input) {
            Some(delta) => self.contribute_to_goal(id, delta).map(Some),
            None => {
                debug!(goal = id, "Ignoring unparseable contribution");
                Ok(None)
            }
        }
    }

    /// Replace the whole ledger, e.g. from a backup
    pub fn restore(&mut self, snapshot: LedgerSnapshot) -> Result<()> {
        self.db.save_ledger(&snapshot.transactions, &snapshot.goals)?;
        info!(
            transactions = snapshot.transactions.len(),
            goals = snapshot.goals.len(),
            "Ledger restored"
        );
        self.ledger = Ledger::from_parts(snapshot.transactions, snapshot.goals);
        Ok(())
    }

    // ── Session ──────────────────────────────────────────────────────────────

    fn store_session(&mut self, session: Option<UserSession>) -> Result<()> {
        self.db.save_user(session.as_ref())?;
        self.session = session;
        Ok(())
    }

    /// Spreadsheet id to reuse on the next login
    pub fn known_spreadsheet_id(&self) -> Option<String> {
        self.session.as_ref().and_then(|s| s.spreadsheet_id.clone())
    }

    /// Apply a successful authentication
    pub fn complete_login(&mut self, outcome: LoginOutcome) -> Result<UserSession> {
        if outcome.spreadsheet_failed {
            self.notifications.error(
                NotificationKind::SpreadsheetCreation,
                messages::SPREADSHEET_CREATE_FAILED,
            );
        }
        info!(email = %outcome.session.email, "Logged in");
        self.store_session(Some(outcome.session.clone()))?;
        Ok(outcome.session)
    }

    /// Record a failed authentication
    pub fn fail_login(&mut self, error: Error) -> Error {
        self.notifications
            .error(NotificationKind::Login, messages::LOGIN_FAILED);
        error
    }

    /// Sign in with a Google access token
    pub async fn login<I, S>(
        &mut self,
        access_token: &str,
        identity: &I,
        sheets: &S,
    ) -> Result<UserSession>
    where
        I: IdentityProvider + ?Sized,
        S: SpreadsheetBackend + ?Sized,
    {
        let existing = self.known_spreadsheet_id();
        match authenticate(access_token, identity, sheets, existing).await {
            Ok(outcome) => self.complete_login(outcome),
            Err(e) => Err(self.fail_login(e)),
        }
    }

    /// Start a local-only session
    pub fn login_as_guest(&mut self, name: &str) -> Result<UserSession> {
        let session = UserSession::guest(name);
        info!(name = %session.name, "Guest session started");
        self.store_session(Some(session.clone()))?;
        Ok(session)
    }

    /// End the session. The ledger stays on this device.
    pub fn logout(&mut self) -> Result<()> {
        self.store_session(None)?;
        info!("Logged out");
        Ok(())
    }

    pub fn set_spreadsheet_id(&mut self, spreadsheet_id: &str) -> Result<()> {
        let mut session = self
            .session
            .clone()
            .ok_or_else(|| Error::Auth("Not logged in".into()))?;
        session.spreadsheet_id = Some(spreadsheet_id.to_string());
        self.store_session(Some(session))
    }

    // ── Sync ─────────────────────────────────────────────────────────────────

    pub fn begin_sync(&mut self) -> Result<SyncJob> {
        let Some(session) = self.session.as_ref().filter(|s| !s.is_guest && !s.access_token.is_empty())
        else {
            self.notifications
                .error(NotificationKind::Sync, messages::LOGIN_REQUIRED);
            let reason = if self.session.is_some() {
                "Guest sessions cannot sync"
            } else {
                "Not logged in"
            };
            return Err(Error::Auth(reason.into()));
        };
        let owner = SyncOwner {
            email: session.email.clone(),
            token: session.access_token.clone(),
        };
        let spreadsheet_id = session.spreadsheet_id.clone();

        let guard = match self.sync_busy.try_acquire("sync") {
            Ok(g) => g,
            Err(e) => {
                self.notifications.error(NotificationKind::Sync, messages::BUSY);
                return Err(e);
            }
        };

        Ok(SyncJob {
            owner,
            spreadsheet_id,
            snapshot: self.ledger.snapshot(),
            guard,
        })
    }

    /// Apply a sync outcome.
    ///
    /// The spreadsheet id is only recorded if the session that started the
    /// sync is still the current one.
    pub fn finish_sync(&mut self, outcome: SyncOutcome) -> Result<SyncReport> {
        let still_owner = self
            .session
            .as_ref()
            .is_some_and(|s| outcome.owner.matches(s));

        match outcome.result {
            Ok((id, report)) => {
                if !still_owner {
                    warn!(
                        email = %outcome.owner.email,
                        spreadsheet = %id,
                        "Session changed during sync, not recording spreadsheet"
                    );
                } else if self.known_spreadsheet_id().as_deref() != Some(id.as_str()) {
                    self.set_spreadsheet_id(&id)?;
                }
                self.notifications
                    .success(NotificationKind::Sync, messages::SYNC_SUCCEEDED);
                Ok(report)
            }
            Err(e @ Error::RemoteCreation(_)) => {
                self.notifications.error(
                    NotificationKind::SpreadsheetCreation,
                    messages::SPREADSHEET_CREATE_FAILED,
                );
                Err(e)
            }
            Err(e) => {
                self.notifications
                    .error(NotificationKind::Sync, messages::SYNC_FAILED);
                Err(e)
            }
        }
    }

    /// Mirror the ledger into the user's spreadsheet
    pub async fn sync<S: SpreadsheetBackend + ?Sized>(&mut self, sheets: &S) -> Result<SyncReport> {
        let job = self.begin_sync()?;
        let outcome = job.run(sheets).await;
        self.finish_sync(outcome)
    }

    // ── Advice ───────────────────────────────────────────────────────────────

    pub fn begin_advice(&mut self) -> Result<AdviceJob> {
        let guard = match self.advice_busy.try_acquire("advice") {
            Ok(g) => g,
            Err(e) => {
                self.notifications
                    .error(NotificationKind::Advice, messages::BUSY);
                return Err(e);
            }
        };
        Ok(AdviceJob {
            snapshot: self.ledger.snapshot(),
            guard,
        })
    }

    pub fn finish_advice(&mut self, outcome: AdviceOutcome) -> Result<AIInsight> {
        outcome.result.map_err(|e| {
            self.notifications
                .error(NotificationKind::Advice, messages::ADVICE_FAILED);
            match e {
                Error::Advice(_) => e,
                other => Error::Advice(other.to_string()),
            }
        })
    }

    /// Ask the AI backend for advice on the current ledger
    pub async fn advise<A: AIBackend + ?Sized>(&mut self, ai: &A) -> Result<AIInsight> {
        let job = self.begin_advice()?;
        let outcome = job.run(ai).await;
        self.finish_advice(outcome)
    }
}
