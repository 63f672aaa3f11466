//! Integration test: single-in-flight invariants
//!
//! Drives the guard with long random sequences of UI actions and wallet
//! callbacks (including callbacks for wrong or superseded intents) and checks
//! after every step that:
//! - at most one intent is owned, and only outside `Idle`
//! - a request outside `Idle` is refused and mutates nothing
//! - refused requests never change the state
//! - intent ids only grow

use basepay_guard::{ConfirmationError, SubmissionError, TransactionGuard};
use basepay_types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn payer() -> Address {
    Address::from_bytes([0xaa; 20])
}

fn merchant() -> Address {
    Address::from_bytes([0xbb; 20])
}

fn units(n: u128) -> TokenAmount {
    TokenAmount::from_base_units(n)
}

fn intent(n: u128) -> PaymentIntent {
    PaymentIntent::new(merchant(), units(n)).unwrap()
}

fn check_structure(guard: &TransactionGuard) {
    let phase = guard.phase();
    assert_eq!(
        phase == GuardPhase::Idle,
        guard.intent().is_none(),
        "phase {phase} with intent {:?}",
        guard.intent()
    );
    assert_eq!(phase == GuardPhase::Failed, guard.failure().is_some());
    assert_eq!(phase == GuardPhase::Succeeded, guard.outcome().is_some());
}

/// Pick a callback id: usually the owned one, sometimes a stale or future one.
fn pick_id(rng: &mut StdRng, guard: &TransactionGuard) -> IntentId {
    let owned = guard.intent().map_or(IntentId(0), |(id, _)| id);
    match rng.gen_range(0..4) {
        0 => IntentId(owned.0.saturating_sub(1)),
        1 => owned.next(),
        _ => owned,
    }
}

#[test]
fn random_event_sequences_preserve_invariants() {
    for seed in 0..50u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut guard = TransactionGuard::new();
        let mut last_id = IntentId(0);

        for _ in 0..400 {
            let before = guard.state().clone();
            match rng.gen_range(0..7) {
                0 | 1 => {
                    let session = if rng.gen_bool(0.9) {
                        WalletSession::connected(payer())
                    } else {
                        WalletSession::disconnected()
                    };
                    let balance = if rng.gen_bool(0.85) {
                        Some(BalanceSnapshot::new(payer(), units(rng.gen_range(0..3_000_000))))
                    } else {
                        None
                    };
                    let amount = rng.gen_range(1..2_000_000);
                    let was_idle = before.phase() == GuardPhase::Idle;
                    match guard.request_payment(&session, balance.as_ref(), intent(amount)) {
                        Ok(submit) => {
                            assert!(was_idle, "admitted outside Idle");
                            assert!(submit.intent_id > last_id, "intent ids must grow");
                            last_id = submit.intent_id;
                            assert_eq!(guard.phase(), GuardPhase::Submitting);
                        }
                        Err(err) => {
                            assert_eq!(guard.state(), &before, "refused request mutated state");
                            if !was_idle && session.connected {
                                assert_eq!(err, BasepayError::AlreadyInProgress);
                            }
                        }
                    }
                }
                2 => {
                    let id = pick_id(&mut rng, &guard);
                    guard.on_signature_prompted(id);
                }
                3 => {
                    let id = pick_id(&mut rng, &guard);
                    let result = match rng.gen_range(0..4) {
                        0 => Err(SubmissionError::Rejected),
                        1 => Err(SubmissionError::Wallet("rpc error".into())),
                        _ => Ok(TxHash::from_bytes([rng.r#gen(); 32])),
                    };
                    guard.on_signature_result(id, result);
                }
                4 => {
                    let id = pick_id(&mut rng, &guard);
                    let owned = guard.state().intent_id() == Some(id);
                    let awaiting = guard.phase() == GuardPhase::AwaitingConfirmation;
                    let result = match (rng.gen_range(0..5), guard.state().tx_hash()) {
                        (0, _) => Err(ConfirmationError::Reverted),
                        (1, _) => Err(ConfirmationError::Dropped),
                        (2, Some(tx)) => Ok(Receipt {
                            tx_hash: TxHash::from_bytes([!tx.as_bytes()[0]; 32]),
                            block_number: 1,
                            status: true,
                        }),
                        (_, Some(tx)) => Ok(Receipt {
                            tx_hash: tx,
                            block_number: 1,
                            status: true,
                        }),
                        (_, None) => Err(ConfirmationError::Timeout),
                    };
                    let outcome = guard.on_confirmation_result(id, result);
                    // A result for the owned, confirming intent always settles it.
                    if owned && awaiting {
                        assert!(!outcome.is_ignored());
                        assert!(guard.phase().is_terminal());
                    }
                }
                _ => {
                    let in_flight = before.phase().is_in_flight();
                    let res = guard.reset();
                    if in_flight {
                        assert_eq!(res, Err(BasepayError::ResetWhileInFlight));
                        assert_eq!(guard.state(), &before);
                    } else {
                        assert!(res.is_ok());
                        assert_eq!(guard.phase(), GuardPhase::Idle);
                    }
                }
            }

            check_structure(&guard);
            // An owned intent is always the most recently admitted one.
            if let Some((id, _)) = guard.intent() {
                assert_eq!(id, last_id);
            }
        }
    }
}

#[test]
fn every_in_flight_path_terminates() {
    // Each pair is (signature result, confirmation result); confirmation
    // is skipped when signing fails.
    let signatures = [
        Ok(TxHash::from_bytes([1; 32])),
        Err(SubmissionError::Rejected),
        Err(SubmissionError::Wallet("boom".into())),
    ];
    let confirmations = [
        Ok(true),
        Ok(false),
        Err(ConfirmationError::Reverted),
        Err(ConfirmationError::Dropped),
        Err(ConfirmationError::Timeout),
        Err(ConfirmationError::Other("replaced".into())),
    ];

    for prompted in [false, true] {
        for sig in &signatures {
            for conf in &confirmations {
                let mut guard = TransactionGuard::new();
                let submit = guard
                    .request_payment(
                        &WalletSession::connected(payer()),
                        Some(&BalanceSnapshot::new(payer(), units(10))),
                        intent(10),
                    )
                    .unwrap();
                if prompted {
                    guard.on_signature_prompted(submit.intent_id);
                }
                guard.on_signature_result(submit.intent_id, sig.clone());
                if guard.phase() == GuardPhase::AwaitingConfirmation {
                    let tx = guard.state().tx_hash().unwrap();
                    let result = conf.clone().map(|status| Receipt {
                        tx_hash: tx,
                        block_number: 9,
                        status,
                    });
                    guard.on_confirmation_result(submit.intent_id, result);
                }
                assert!(
                    guard.phase().is_terminal(),
                    "stuck in {} for sig={sig:?} conf={conf:?}",
                    guard.phase()
                );
                guard.reset().unwrap();
                assert_eq!(guard.phase(), GuardPhase::Idle);
                assert!(guard.intent().is_none());
            }
        }
    }
}

#[test]
fn terminal_states_are_occupied_until_reset() {
    let mut guard = TransactionGuard::new();
    let session = WalletSession::connected(payer());
    let balance = BalanceSnapshot::new(payer(), units(5_000_000));

    let submit = guard
        .request_payment(&session, Some(&balance), intent(1_000_000))
        .unwrap();
    guard.on_signature_result(submit.intent_id, Ok(TxHash::from_bytes([4; 32])));
    guard.on_confirmation_result(submit.intent_id, Err(ConfirmationError::Reverted));
    assert_eq!(
        guard.failure(),
        Some(&FailureKind::ConfirmationFailed("reverted".into()))
    );

    for _ in 0..5 {
        assert_eq!(
            guard.request_payment(&session, Some(&balance), intent(1_000_000)),
            Err(BasepayError::AlreadyInProgress)
        );
    }
    assert_eq!(guard.phase(), GuardPhase::Failed);

    guard.reset().unwrap();
    let second = guard
        .request_payment(&session, Some(&balance), intent(1_000_000))
        .unwrap();
    assert_eq!(second.intent_id, submit.intent_id.next());
}
