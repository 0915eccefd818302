use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::{debug, warn};
use tradesheet_core::gateway::envelope::ResultEnvelope;
use tradesheet_core::gateway::error::GatewayError;

/// Outcome delivered to the caller waiting on a registration.
pub type CallOutcome = Result<Value, GatewayError>;

const TOKEN_PREFIX: &str = "jsonp_callback";
const SUFFIX_LEN: usize = 9;

/// # Summary
/// Pending Call Registration: bookkeeping for one in-flight cross-origin call.
///
/// # Invariants
/// - Lives only inside `CallbackRegistry`; removing it from the map is the
///   single point where cleanup happens.
struct PendingCall {
    sender: oneshot::Sender<CallOutcome>,
    // 脚本加载任务 (相当于注入页面的 script 节点)
    loader: Option<AbortHandle>,
    // 超时计时任务
    timer: Option<AbortHandle>,
}

impl PendingCall {
    fn release(&self) {
        if let Some(loader) = &self.loader {
            loader.abort();
        }
        if let Some(timer) = &self.timer {
            timer.abort();
        }
    }
}

/// # Summary
/// Concurrency-safe registry of callbacks addressable by call token, standing
/// in for the page-global callback namespace.
///
/// # Invariants
/// - Tokens are unique among live registrations.
/// - For every registration exactly one of {resolve, deregister} takes effect;
///   any later attempt finds nothing and is a no-op.
/// - Taking a registration out aborts its loader and timer before the outcome
///   is delivered, so neither can fire afterwards.
#[derive(Default)]
pub struct CallbackRegistry {
    pending: DashMap<String, PendingCall>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Summary
    /// Generates a call token from the current time and a random suffix.
    ///
    /// # Returns
    /// A token such as `jsonp_callback_1714550400000_3f9a1c2b7`, valid as a
    /// script identifier.
    pub fn next_token() -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let random = uuid::Uuid::new_v4().simple().to_string();
        let suffix = random.get(..SUFFIX_LEN).unwrap_or(&random);
        format!("{}_{}_{}", TOKEN_PREFIX, millis, suffix)
    }

    /// # Summary
    /// Creates a registration under a fresh token.
    ///
    /// # Logic
    /// 1. Generate a token.
    /// 2. Insert through the entry API; on the rare collision, generate again.
    ///
    /// # Returns
    /// The token and the receiver that will see the call's single outcome.
    pub fn register(&self) -> (String, oneshot::Receiver<CallOutcome>) {
        loop {
            match self.pending.entry(Self::next_token()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let token = slot.key().clone();
                    let (sender, receiver) = oneshot::channel();
                    slot.insert(PendingCall {
                        sender,
                        loader: None,
                        timer: None,
                    });
                    return (token, receiver);
                }
            }
        }
    }

    /// # Summary
    /// Stores the loader and timer handles of a live registration.
    ///
    /// # Logic
    /// If the registration already resolved (the loader can finish before the
    /// handles are attached), both tasks are aborted instead.
    ///
    /// # Returns
    /// `true` when the handles were attached.
    pub fn attach(&self, token: &str, loader: AbortHandle, timer: AbortHandle) -> bool {
        match self.pending.get_mut(token) {
            Some(mut call) => {
                call.loader = Some(loader);
                call.timer = Some(timer);
                true
            }
            None => {
                loader.abort();
                timer.abort();
                false
            }
        }
    }

    /// # Summary
    /// Completes a registration with `outcome`.
    ///
    /// # Logic
    /// 1. Remove the registration (presence test and removal are one atomic step).
    /// 2. Abort its loader and timer.
    /// 3. Deliver the outcome; a caller that already went away is only logged.
    ///
    /// # Returns
    /// `false` when nothing was registered under `token`.
    pub fn resolve(&self, token: &str, outcome: CallOutcome) -> bool {
        let Some((_, call)) = self.pending.remove(token) else {
            debug!(token, "no pending call, outcome dropped");
            return false;
        };
        call.release();
        if call.sender.send(outcome).is_err() {
            debug!(token, "caller no longer waiting");
        }
        true
    }

    /// # Summary
    /// Invokes the callback registered as `token` with the script's argument.
    ///
    /// The argument is read as a Result Envelope: an `error` rejects, otherwise
    /// `data` (or the whole argument) resolves.
    pub fn invoke(&self, token: &str, argument: Value) -> bool {
        if !self.pending.contains_key(token) {
            warn!(callback = token, "script invoked an unknown callback");
            return false;
        }
        self.resolve(token, ResultEnvelope::into_result(argument))
    }

    /// Drops a registration without delivering anything.
    pub fn deregister(&self, token: &str) -> bool {
        match self.pending.remove(token) {
            Some((_, call)) => {
                call.release();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.pending.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
