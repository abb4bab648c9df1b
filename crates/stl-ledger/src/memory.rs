//! # In-Memory Reference Ledger
//!
//! Implements the contract rules without a network:
//!
//! - ids are assigned sequentially from 1; each applied call advances the
//!   block height by one,
//! - a signed call is refused outright if its signature does not verify or
//!   its nonce is not above the sender's last one,
//! - a call that passes those checks becomes a transaction; contract-level
//!   failures (wrong state, hash mismatch, role not on the allow-list) mark
//!   the transaction failed and leave the incident untouched,
//! - the first valid reveal of an incident wins; later ones fail because
//!   the incident is no longer pending.
//!
//! Calls are applied immediately by default. With
//! [`hold_blocks`](InMemoryLedger::hold_blocks) they queue as pending until
//! [`mine`](InMemoryLedger::mine) is called, which lets tests observe the
//! interval between submission and confirmation.
//!
//! All state sits behind one `parking_lot::RwLock`, never held across an
//! `.await`.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;
use stl_arbitration::{DisputeAction, DisputePolicy};
use stl_core::{Clock, IncidentId, IncidentType, Principal, Role, SystemClock, TxId};
use stl_crypto::hashes_match;
use stl_state::{
    AuditorDecision, Commitments, Incident, IncidentStatus, RevealPayload, RevealWindow,
};

use crate::call::{ContractCall, SignedCall, TxHandle, TxStatus};
use crate::error::LedgerError;
use crate::traits::{LedgerReader, LedgerWriter};

#[derive(Debug, Default)]
struct LedgerState {
    incidents: BTreeMap<IncidentId, Incident>,
    last_id: u64,
    height: u64,
    txs: HashMap<TxId, TxStatus>,
    queued: VecDeque<(TxId, SignedCall)>,
    nonces: HashMap<Principal, u64>,
    roles: HashMap<Principal, Role>,
    hold: bool,
}

/// Contract-rule reference ledger.
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    window: RevealWindow,
    policy: DisputePolicy,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.state.read();
        f.debug_struct("InMemoryLedger")
            .field("incidents", &st.incidents.len())
            .field("height", &st.height)
            .field("window", &self.window)
            .finish()
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(RevealWindow::default(), Arc::new(SystemClock))
    }
}

impl InMemoryLedger {
    pub fn new(window: RevealWindow, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            window,
            policy: DisputePolicy::default(),
            clock,
        }
    }

    pub fn with_policy(mut self, policy: DisputePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn window(&self) -> RevealWindow {
        self.window
    }

    /// Put a principal on the role allow-list. Unlisted principals are
    /// reporters.
    pub fn grant_role(&self, principal: Principal, role: Role) {
        self.state.write().roles.insert(principal, role);
    }

    /// Queue calls as pending instead of applying them on submit.
    pub fn hold_blocks(&self, hold: bool) {
        self.state.write().hold = hold;
    }

    /// Apply every queued call in submission order. Returns how many ran.
    pub fn mine(&self) -> usize {
        let mut st = self.state.write();
        let mut applied = 0;
        while let Some((tx, call)) = st.queued.pop_front() {
            let outcome = self.execute(&mut st, &call);
            st.txs.insert(tx, outcome);
            applied += 1;
        }
        applied
    }

    /// Calls waiting for [`mine`](Self::mine).
    pub fn queued(&self) -> usize {
        self.state.read().queued.len()
    }

    pub fn height(&self) -> u64 {
        self.state.read().height
    }

    fn role_of(st: &LedgerState, who: &Principal) -> Role {
        st.roles.get(who).copied().unwrap_or(Role::Reporter)
    }

    /// Run one call against the contract rules.
    fn execute(&self, st: &mut LedgerState, signed: &SignedCall) -> TxStatus {
        let now = self.clock.now();
        let result = match &signed.call {
            ContractCall::CommitIncident {
                evidence_hash,
                meta_hash,
                geo_hash,
                type_code,
            } => {
                st.last_id += 1;
                let id = IncidentId(st.last_id);
                let incident = Incident::committed(
                    id,
                    signed.sender.clone(),
                    Commitments {
                        evidence_hash: *evidence_hash,
                        meta_hash: *meta_hash,
                        geo_hash: *geo_hash,
                        incident_type: IncidentType::from_code(*type_code),
                    },
                    st.height + 1,
                    now,
                );
                st.incidents.insert(id, incident);
                Ok(id)
            }

            ContractCall::RevealIncident {
                id,
                locator,
                meta_hash,
                salt,
                evidence_hash,
            } => match st.incidents.get_mut(id) {
                None => Err(format!("incident {id} does not exist")),
                Some(inc) => {
                    inc.refresh(&self.window, &now);
                    let c = inc.commitments();
                    if inc.status() != IncidentStatus::Pending {
                        Err(format!("incident {id} is {}, not pending", inc.status()))
                    } else if !hashes_match(&c.evidence_hash, evidence_hash) {
                        Err("evidence hash does not match commitment".to_string())
                    } else if !hashes_match(&c.meta_hash, meta_hash) {
                        Err("metadata hash does not match commitment".to_string())
                    } else {
                        let payload = RevealPayload {
                            locator: locator.clone(),
                            meta_hash: *meta_hash,
                            salt: salt.clone(),
                        };
                        inc.reveal(payload, now)
                            .map(|_| *id)
                            .map_err(|e| e.to_string())
                    }
                }
            },

            ContractCall::OpenDispute { id, reason_hash } => {
                let role = Self::role_of(st, &signed.sender);
                match self.policy.authorize(DisputeAction::Open, role) {
                    Err(e) => Err(e.to_string()),
                    Ok(()) => match st.incidents.get_mut(id) {
                        None => Err(format!("incident {id} does not exist")),
                        Some(inc) => {
                            inc.refresh(&self.window, &now);
                            inc.open_dispute(*reason_hash, now)
                                .map(|_| *id)
                                .map_err(|e| e.to_string())
                        }
                    },
                }
            }

            ContractCall::ResolveDispute { id, new_status } => {
                let role = Self::role_of(st, &signed.sender);
                let decision = IncidentStatus::from_code(*new_status)
                    .ok()
                    .and_then(AuditorDecision::from_status);
                match (self.policy.authorize(DisputeAction::Resolve, role), decision) {
                    (Err(e), _) => Err(e.to_string()),
                    (Ok(()), None) => Err(format!("status {new_status} cannot close a dispute")),
                    (Ok(()), Some(decision)) => match st.incidents.get_mut(id) {
                        None => Err(format!("incident {id} does not exist")),
                        Some(inc) => inc
                            .resolve_dispute(decision, now)
                            .map(|_| *id)
                            .map_err(|e| e.to_string()),
                    },
                }
            }
        };

        st.height += 1;
        match result {
            Ok(id) => {
                tracing::debug!(function = signed.call.function_name(), incident = %id, "applied call");
                TxStatus::Confirmed { incident: Some(id) }
            }
            Err(reason) => {
                tracing::debug!(function = signed.call.function_name(), %reason, "call failed");
                TxStatus::Failed { reason }
            }
        }
    }
}

impl LedgerReader for InMemoryLedger {
    async fn get_incident(&self, id: IncidentId) -> Result<Incident, LedgerError> {
        self.state
            .read()
            .incidents
            .get(&id)
            .cloned()
            .ok_or(LedgerError::NotFound(id))
    }

    async fn incident_count(&self) -> Result<u64, LedgerError> {
        Ok(self.state.read().last_id)
    }

    async fn tx_status(&self, tx: &TxId) -> Result<TxStatus, LedgerError> {
        self.state
            .read()
            .txs
            .get(tx)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownTx(tx.clone()))
    }
}

impl LedgerWriter for InMemoryLedger {
    async fn submit(&self, call: SignedCall) -> Result<TxHandle, LedgerError> {
        call.verify()?;
        let function = call.call.function_name();

        let mut st = self.state.write();
        let last = st.nonces.get(&call.sender).copied().unwrap_or(0);
        if call.nonce <= last {
            return Err(LedgerError::Rejected {
                function: function.to_string(),
                reason: format!("nonce {} not above {last}", call.nonce),
            });
        }
        st.nonces.insert(call.sender.clone(), call.nonce);

        let tx_id = TxId(format!("0x{}", uuid::Uuid::new_v4().simple()));
        if st.hold {
            st.txs.insert(tx_id.clone(), TxStatus::Pending);
            st.queued.push_back((tx_id.clone(), call));
        } else {
            let outcome = self.execute(&mut st, &call);
            st.txs.insert(tx_id.clone(), outcome);
        }

        Ok(TxHandle {
            tx_id,
            function: function.to_string(),
            submitted_at: self.clock.now(),
        })
    }
}
