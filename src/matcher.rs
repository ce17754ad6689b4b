use rusqlite::Connection;

use crate::dates;
use crate::error::{HavenError, Result};
use crate::models::Participant;

/// Description tokens that identify an SDA funding payer.
pub const FUNDING_KEYWORDS: &[&str] = &["ndis", "ndia", "plan manager", "sda"];

/// Generic rent-collection keyword; rent contributions arrive via Centrepay.
pub const RENT_KEYWORD: &str = "centrepay";

pub const CONFIDENCE_SDA_AMOUNT: i64 = 85;
pub const CONFIDENCE_RRC_AMOUNT: i64 = 80;
pub const CONFIDENCE_PARTICIPANT_ONLY: i64 = 60;

/// Minimum confidence the automatic pass will apply without a human.
pub const AUTO_APPLY_THRESHOLD: i64 = 80;

/// Strict relative amount tolerance: |expected - actual| < expected * fraction.
fn within_tolerance(expected: f64, actual: f64, fraction: f64) -> bool {
    (expected - actual).abs() < expected * fraction
}

// ---------------------------------------------------------------------------
// Snapshots: rows loaded once per pass, matching is pure over these
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TxSnapshot {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub amount: f64,
}

#[derive(Debug, Clone)]
pub struct ObligationSnapshot {
    pub id: i64,
    pub payment_type: String,
    pub participant_id: Option<i64>,
    pub expected_amount: f64,
    pub expected_date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchTarget {
    SdaObligation(i64),
    RrcObligation(i64),
    Participant(i64),
}

#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub target: MatchTarget,
    pub confidence: i64,
    date_distance: i64,
    target_id: i64,
}

fn tx_matches_participant(description_lower: &str, participant: &Participant) -> bool {
    description_lower.contains(&participant.full_name().to_lowercase())
        || description_lower.contains(&participant.ndis_number)
        || description_lower.contains(RENT_KEYWORD)
}

fn has_funding_keyword(description_lower: &str) -> bool {
    FUNDING_KEYWORDS.iter().any(|k| description_lower.contains(k))
}

/// Score one transaction against the pending obligations and active
/// participants. Pure: collects every candidate, then selects by highest
/// confidence, nearest expected date to the transaction date, lowest id.
/// Only credit transactions ever produce a candidate.
pub fn best_match(
    tx: &TxSnapshot,
    participants: &[Participant],
    obligations: &[ObligationSnapshot],
) -> Option<MatchCandidate> {
    if tx.amount <= 0.0 {
        return None;
    }
    let description = tx.description.to_lowercase();
    let mut candidates: Vec<MatchCandidate> = Vec::new();

    if has_funding_keyword(&description) {
        for ob in obligations {
            if ob.payment_type == "sda_income"
                && within_tolerance(ob.expected_amount, tx.amount, 0.01)
            {
                candidates.push(MatchCandidate {
                    target: MatchTarget::SdaObligation(ob.id),
                    confidence: CONFIDENCE_SDA_AMOUNT,
                    date_distance: dates::days_between(&ob.expected_date, &tx.date)
                        .unwrap_or(i64::MAX),
                    target_id: ob.id,
                });
            }
        }
    }

    for participant in participants {
        if !tx_matches_participant(&description, participant) {
            continue;
        }
        let mut found_rrc = false;
        for ob in obligations {
            if ob.payment_type == "rrc_income"
                && ob.participant_id == Some(participant.id)
                && within_tolerance(ob.expected_amount, tx.amount, 0.05)
            {
                found_rrc = true;
                candidates.push(MatchCandidate {
                    target: MatchTarget::RrcObligation(ob.id),
                    confidence: CONFIDENCE_RRC_AMOUNT,
                    date_distance: dates::days_between(&ob.expected_date, &tx.date)
                        .unwrap_or(i64::MAX),
                    target_id: ob.id,
                });
            }
        }
        if !found_rrc {
            candidates.push(MatchCandidate {
                target: MatchTarget::Participant(participant.id),
                confidence: CONFIDENCE_PARTICIPANT_ONLY,
                date_distance: i64::MAX,
                target_id: participant.id,
            });
        }
    }

    candidates.into_iter().min_by(|a, b| {
        b.confidence
            .cmp(&a.confidence)
            .then(a.date_distance.cmp(&b.date_distance))
            .then(a.target_id.cmp(&b.target_id))
    })
}

// ---------------------------------------------------------------------------
// Automatic pass: the two call sites (post-import, on-demand) both land here
// ---------------------------------------------------------------------------

pub struct AutoMatchResult {
    pub scanned: usize,
    pub matched: usize,
}

fn load_unmatched(conn: &Connection, account_id: i64) -> Result<Vec<TxSnapshot>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, description, amount FROM bank_transactions \
         WHERE account_id = ?1 AND match_status = 'unmatched' ORDER BY date, id",
    )?;
    let rows = stmt
        .query_map([account_id], |row| {
            Ok(TxSnapshot {
                id: row.get(0)?,
                date: row.get(1)?,
                description: row.get(2)?,
                amount: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn load_active_participants(conn: &Connection) -> Result<Vec<Participant>> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, ndis_number, property_id, status \
         FROM participants WHERE status = 'active' ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Participant {
                id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                ndis_number: row.get(3)?,
                property_id: row.get(4)?,
                status: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn load_pending_obligations(conn: &Connection) -> Result<Vec<ObligationSnapshot>> {
    let mut stmt = conn.prepare(
        "SELECT id, payment_type, participant_id, expected_amount, expected_date \
         FROM expected_payments WHERE status = 'pending' ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ObligationSnapshot {
                id: row.get(0)?,
                payment_type: row.get(1)?,
                participant_id: row.get(2)?,
                expected_amount: row.get(3)?,
                expected_date: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn apply_candidate(conn: &Connection, tx_id: i64, candidate: &MatchCandidate) -> Result<()> {
    let (fk_column, fk_id, category) = match candidate.target {
        MatchTarget::SdaObligation(id) => ("matched_expected_payment_id", id, "sda_income"),
        MatchTarget::RrcObligation(id) => ("matched_expected_payment_id", id, "rrc_income"),
        MatchTarget::Participant(id) => ("matched_participant_id", id, "rrc_income"),
    };
    let sql = format!(
        "UPDATE bank_transactions SET match_status = 'matched', {fk_column} = ?1, \
         match_confidence = ?2, category = ?3, updated_at = datetime('now') WHERE id = ?4"
    );
    conn.execute(&sql, rusqlite::params![fk_id, candidate.confidence, category, tx_id])?;
    Ok(())
}

/// Score every unmatched transaction for one account and apply only
/// candidates at or above the auto-apply threshold. Debits are left alone.
pub fn auto_match(conn: &Connection, account_id: i64) -> Result<AutoMatchResult> {
    let transactions = load_unmatched(conn, account_id)?;
    let participants = load_active_participants(conn)?;
    let obligations = load_pending_obligations(conn)?;

    let mut matched = 0usize;
    for tx in &transactions {
        if let Some(candidate) = best_match(tx, &participants, &obligations) {
            if candidate.confidence >= AUTO_APPLY_THRESHOLD {
                apply_candidate(conn, tx.id, &candidate)?;
                matched += 1;
            }
        }
    }

    Ok(AutoMatchResult {
        scanned: transactions.len(),
        matched,
    })
}

// ---------------------------------------------------------------------------
// Suggestion ranker: advisory, additive scoring, never mutates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Suggestion {
    pub kind: &'static str,
    pub id: i64,
    pub description: String,
    pub amount: f64,
    pub confidence: i64,
}

const SUGGESTION_FLOOR: i64 = 30;
const SUGGESTION_LIMIT: usize = 5;

/// Additive score for an obligation candidate: amount proximity up to 50,
/// date proximity up to 30.
fn score_obligation(expected_amount: f64, expected_date: &str, tx_amount: f64, tx_date: &str) -> i64 {
    let mut confidence = 0;
    let diff = (expected_amount - tx_amount).abs() / expected_amount;
    if diff < 0.01 {
        confidence += 50;
    } else if diff < 0.05 {
        confidence += 30;
    }
    if let Some(days) = dates::days_between(expected_date, tx_date) {
        if days < 1 {
            confidence += 30;
        } else if days < 7 {
            confidence += 15;
        }
    }
    confidence
}

/// Ranked match suggestions for one transaction, for a human reviewer.
/// Read-only; returns at most five candidates scoring above the floor.
pub fn suggest_matches(conn: &Connection, transaction_id: i64) -> Result<Vec<Suggestion>> {
    let tx: TxSnapshot = conn
        .query_row(
            "SELECT id, date, description, amount FROM bank_transactions WHERE id = ?1",
            [transaction_id],
            |row| {
                Ok(TxSnapshot {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    description: row.get(2)?,
                    amount: row.get(3)?,
                })
            },
        )
        .map_err(|_| HavenError::NotFound("transaction", transaction_id))?;

    let description = tx.description.to_lowercase();
    let mut suggestions: Vec<Suggestion> = Vec::new();

    if tx.amount > 0.0 {
        let mut stmt = conn.prepare(
            "SELECT ep.id, ep.payment_type, ep.expected_amount, ep.expected_date, \
                    pa.first_name, pa.last_name \
             FROM expected_payments ep LEFT JOIN participants pa ON pa.id = ep.participant_id \
             WHERE ep.status = 'pending' ORDER BY ep.id",
        )?;
        let obligations: Vec<(i64, String, f64, String, Option<String>, Option<String>)> = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for (id, payment_type, expected_amount, expected_date, first, last) in obligations {
            let confidence = score_obligation(expected_amount, &expected_date, tx.amount, &tx.date);
            if confidence <= SUGGESTION_FLOOR {
                continue;
            }
            let type_label = payment_type.replace('_', " ");
            let label = match (first, last) {
                (Some(f), Some(l)) => format!("{f} {l} - {type_label}"),
                _ => format!("Expected {type_label}"),
            };
            suggestions.push(Suggestion {
                kind: "expected_payment",
                id,
                description: label,
                amount: expected_amount,
                confidence,
            });
        }

        for participant in load_active_participants(conn)? {
            let name_hit = description.contains(&participant.full_name().to_lowercase())
                || description.contains(&participant.ndis_number);
            if name_hit {
                suggestions.push(Suggestion {
                    kind: "participant",
                    id: participant.id,
                    description: format!("{} (RRC)", participant.full_name()),
                    amount: 0.0,
                    confidence: 70,
                });
            }
        }
    }

    if tx.amount < 0.0 {
        let mut stmt = conn.prepare(
            "SELECT op.id, op.amount, ow.name FROM owner_payments op \
             JOIN owners ow ON ow.id = op.owner_id \
             WHERE op.status = 'pending' ORDER BY op.id",
        )?;
        let owner_payments: Vec<(i64, f64, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for (id, amount, owner_name) in owner_payments {
            if within_tolerance(amount, tx.amount.abs(), 0.01) {
                suggestions.push(Suggestion {
                    kind: "owner_payment",
                    id,
                    description: format!("Payment to {owner_name}"),
                    amount,
                    confidence: 80,
                });
            }
        }
    }

    suggestions.sort_by(|a, b| b.confidence.cmp(&a.confidence).then(a.id.cmp(&b.id)));
    suggestions.truncate(SUGGESTION_LIMIT);
    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn add_account(conn: &Connection) -> i64 {
        conn.execute("INSERT INTO accounts (name) VALUES ('Operating')", []).unwrap();
        conn.last_insert_rowid()
    }

    fn add_participant(conn: &Connection, first: &str, last: &str, ndis: &str) -> i64 {
        conn.execute(
            "INSERT INTO participants (first_name, last_name, ndis_number) VALUES (?1, ?2, ?3)",
            rusqlite::params![first, last, ndis],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn add_obligation(
        conn: &Connection,
        payment_type: &str,
        participant_id: Option<i64>,
        amount: f64,
        expected_date: &str,
    ) -> i64 {
        conn.execute(
            "INSERT INTO expected_payments (payment_type, participant_id, expected_amount, \
             expected_date, period_month, status, source_type) \
             VALUES (?1, ?2, ?3, ?4, substr(?4, 1, 7), 'pending', 'auto_generated')",
            rusqlite::params![payment_type, participant_id, amount, expected_date],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn add_tx(conn: &Connection, account_id: i64, date: &str, desc: &str, amount: f64) -> i64 {
        conn.execute(
            "INSERT INTO bank_transactions (account_id, date, description, amount, transaction_type) \
             VALUES (?1, ?2, ?3, ?4, CASE WHEN ?4 >= 0 THEN 'credit' ELSE 'debit' END)",
            rusqlite::params![account_id, date, desc, amount],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn tx_row(conn: &Connection, id: i64) -> (String, Option<i64>, Option<i64>, Option<i64>, Option<String>) {
        conn.query_row(
            "SELECT match_status, matched_expected_payment_id, matched_participant_id, \
             match_confidence, category FROM bank_transactions WHERE id = ?1",
            [id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
        )
        .unwrap()
    }

    // -- best_match (pure) --

    fn snapshot(date: &str, desc: &str, amount: f64) -> TxSnapshot {
        TxSnapshot {
            id: 1,
            date: date.to_string(),
            description: desc.to_string(),
            amount,
        }
    }

    fn obligation(id: i64, payment_type: &str, participant: Option<i64>, amount: f64, date: &str) -> ObligationSnapshot {
        ObligationSnapshot {
            id,
            payment_type: payment_type.to_string(),
            participant_id: participant,
            expected_amount: amount,
            expected_date: date.to_string(),
        }
    }

    fn participant(id: i64, first: &str, last: &str, ndis: &str) -> Participant {
        Participant {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            ndis_number: ndis.to_string(),
            property_id: None,
            status: "active".to_string(),
        }
    }

    #[test]
    fn test_keyword_and_exact_amount_scores_85() {
        let tx = snapshot("2025-03-15", "NDIS PAYMENT REF 12345", 500.0);
        let obligations = [obligation(1, "sda_income", Some(1), 500.0, "2025-03-15")];
        let best = best_match(&tx, &[], &obligations).unwrap();
        assert_eq!(best.confidence, 85);
        assert_eq!(best.target, MatchTarget::SdaObligation(1));
    }

    #[test]
    fn test_keyword_without_amount_match_is_no_candidate() {
        let tx = snapshot("2025-03-15", "NDIS PAYMENT", 900.0);
        let obligations = [obligation(1, "sda_income", Some(1), 500.0, "2025-03-15")];
        assert!(best_match(&tx, &[], &obligations).is_none());
    }

    #[test]
    fn test_rrc_tolerance_is_strictly_under_5_percent() {
        let jane = participant(1, "Jane", "Citizen", "4300000001");
        let obligations = [obligation(1, "rrc_income", Some(1), 500.0, "2025-03-31")];
        // Exactly 5% above: |525 - 500| = 25 is not < 25, so only the bare
        // participant candidate at 60 remains.
        let at_boundary = snapshot("2025-03-31", "CENTREPAY JANE CITIZEN", 525.0);
        let best = best_match(&at_boundary, std::slice::from_ref(&jane), &obligations).unwrap();
        assert_eq!(best.confidence, 60);
        assert_eq!(best.target, MatchTarget::Participant(1));
        // Just inside the band scores 80.
        let inside = snapshot("2025-03-31", "CENTREPAY JANE CITIZEN", 524.0);
        let best = best_match(&inside, std::slice::from_ref(&jane), &obligations).unwrap();
        assert_eq!(best.confidence, 80);
        assert_eq!(best.target, MatchTarget::RrcObligation(1));
    }

    #[test]
    fn test_participant_matched_by_ndis_number() {
        let jane = participant(1, "Jane", "Citizen", "4300000001");
        let tx = snapshot("2025-03-31", "DIRECT CREDIT 4300000001", 100.0);
        let best = best_match(&tx, std::slice::from_ref(&jane), &[]).unwrap();
        assert_eq!(best.target, MatchTarget::Participant(1));
        assert_eq!(best.confidence, 60);
    }

    #[test]
    fn test_debit_never_matches() {
        let jane = participant(1, "Jane", "Citizen", "4300000001");
        let obligations = [obligation(1, "rrc_income", Some(1), 500.0, "2025-03-31")];
        let tx = snapshot("2025-03-31", "CENTREPAY JANE CITIZEN", -500.0);
        assert!(best_match(&tx, &[jane], &obligations).is_none());
    }

    #[test]
    fn test_tie_breaks_by_nearest_date_then_lowest_id() {
        let tx = snapshot("2025-03-14", "NDIA SDA CLAIM", 500.0);
        let far = obligation(1, "sda_income", Some(1), 500.0, "2025-03-28");
        let near = obligation(2, "sda_income", Some(2), 500.0, "2025-03-15");
        let best = best_match(&tx, &[], &[far.clone(), near.clone()]).unwrap();
        assert_eq!(best.target, MatchTarget::SdaObligation(2));
        // Same distance: lowest id wins.
        let twin_a = obligation(3, "sda_income", Some(1), 500.0, "2025-03-15");
        let twin_b = obligation(4, "sda_income", Some(2), 500.0, "2025-03-15");
        let best = best_match(&tx, &[], &[twin_b, twin_a]).unwrap();
        assert_eq!(best.target, MatchTarget::SdaObligation(3));
    }

    #[test]
    fn test_rrc_obligation_beats_bare_participant() {
        let jane = participant(1, "Jane", "Citizen", "4300000001");
        let obligations = [obligation(1, "rrc_income", Some(1), 433.33, "2025-03-31")];
        let tx = snapshot("2025-03-20", "CENTREPAY JANE CITIZEN", 433.33);
        let best = best_match(&tx, &[jane], &obligations).unwrap();
        assert_eq!(best.confidence, 80);
        assert_eq!(best.target, MatchTarget::RrcObligation(1));
    }

    // -- auto_match (applies to the store) --

    #[test]
    fn test_auto_match_applies_sda_at_85() {
        let (_dir, conn) = test_db();
        let account = add_account(&conn);
        let p = add_participant(&conn, "Jane", "Citizen", "4300000001");
        let ob = add_obligation(&conn, "sda_income", Some(p), 500.0, "2025-03-15");
        let tx = add_tx(&conn, account, "2025-03-15", "NDIS PAYMENT 4300000001", 500.0);

        let result = auto_match(&conn, account).unwrap();
        assert_eq!(result.matched, 1);
        let (status, ep_id, _, confidence, category) = tx_row(&conn, tx);
        assert_eq!(status, "matched");
        assert_eq!(ep_id, Some(ob));
        assert_eq!(confidence, Some(85));
        assert_eq!(category.as_deref(), Some("sda_income"));
    }

    #[test]
    fn test_auto_match_stamps_rrc_category() {
        let (_dir, conn) = test_db();
        let account = add_account(&conn);
        let p = add_participant(&conn, "Jane", "Citizen", "4300000001");
        let ob = add_obligation(&conn, "rrc_income", Some(p), 433.33, "2025-03-31");
        let tx = add_tx(&conn, account, "2025-03-28", "CENTREPAY JANE CITIZEN", 433.33);

        auto_match(&conn, account).unwrap();
        let (status, ep_id, _, confidence, category) = tx_row(&conn, tx);
        assert_eq!(status, "matched");
        assert_eq!(ep_id, Some(ob));
        assert_eq!(confidence, Some(80));
        assert_eq!(category.as_deref(), Some("rrc_income"));
    }

    #[test]
    fn test_auto_match_does_not_apply_60() {
        let (_dir, conn) = test_db();
        let account = add_account(&conn);
        add_participant(&conn, "Jane", "Citizen", "4300000001");
        let tx = add_tx(&conn, account, "2025-03-28", "TRANSFER JANE CITIZEN", 50.0);

        let result = auto_match(&conn, account).unwrap();
        assert_eq!(result.matched, 0);
        assert_eq!(result.scanned, 1);
        let (status, _, participant_id, confidence, _) = tx_row(&conn, tx);
        assert_eq!(status, "unmatched");
        assert_eq!(participant_id, None);
        assert_eq!(confidence, None);
    }

    #[test]
    fn test_auto_match_skips_other_accounts_and_matched_rows() {
        let (_dir, conn) = test_db();
        let account = add_account(&conn);
        conn.execute("INSERT INTO accounts (name) VALUES ('Trust')", []).unwrap();
        let other = conn.last_insert_rowid();
        let p = add_participant(&conn, "Jane", "Citizen", "4300000001");
        add_obligation(&conn, "sda_income", Some(p), 500.0, "2025-03-15");
        add_tx(&conn, other, "2025-03-15", "NDIS PAYMENT", 500.0);

        let result = auto_match(&conn, account).unwrap();
        assert_eq!(result.scanned, 0);
        assert_eq!(result.matched, 0);
    }

    #[test]
    fn test_auto_match_ignores_non_pending_obligations() {
        let (_dir, conn) = test_db();
        let account = add_account(&conn);
        let p = add_participant(&conn, "Jane", "Citizen", "4300000001");
        let ob = add_obligation(&conn, "sda_income", Some(p), 500.0, "2025-03-15");
        conn.execute("UPDATE expected_payments SET status = 'received' WHERE id = ?1", [ob])
            .unwrap();
        add_tx(&conn, account, "2025-03-15", "NDIS PAYMENT", 500.0);

        let result = auto_match(&conn, account).unwrap();
        assert_eq!(result.matched, 0);
    }

    // -- suggestion ranker --

    #[test]
    fn test_suggest_exact_amount_and_date() {
        let (_dir, conn) = test_db();
        let account = add_account(&conn);
        let p = add_participant(&conn, "Jane", "Citizen", "4300000001");
        add_obligation(&conn, "sda_income", Some(p), 500.0, "2025-03-15");
        let tx = add_tx(&conn, account, "2025-03-15", "DEPOSIT", 500.0);

        let suggestions = suggest_matches(&conn, tx).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].confidence, 80); // 50 amount + 30 date
        assert_eq!(suggestions[0].kind, "expected_payment");
        assert!(suggestions[0].description.contains("Jane Citizen"));
    }

    #[test]
    fn test_suggest_scores_looser_bands() {
        let (_dir, conn) = test_db();
        let account = add_account(&conn);
        add_obligation(&conn, "sda_income", None, 500.0, "2025-03-15");
        // 2% off, 3 days out: 30 + 15 = 45.
        let tx = add_tx(&conn, account, "2025-03-18", "DEPOSIT", 510.0);
        let suggestions = suggest_matches(&conn, tx).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].confidence, 45);
        assert_eq!(suggestions[0].description, "Expected sda income");
    }

    #[test]
    fn test_suggest_drops_scores_at_or_below_floor() {
        let (_dir, conn) = test_db();
        let account = add_account(&conn);
        // Amount 2% off (30), date far away (0): total 30 is not > 30.
        add_obligation(&conn, "sda_income", None, 500.0, "2025-06-15");
        let tx = add_tx(&conn, account, "2025-03-18", "DEPOSIT", 510.0);
        assert!(suggest_matches(&conn, tx).unwrap().is_empty());
    }

    #[test]
    fn test_suggest_participant_name_scores_70() {
        let (_dir, conn) = test_db();
        let account = add_account(&conn);
        add_participant(&conn, "Jane", "Citizen", "4300000001");
        let tx = add_tx(&conn, account, "2025-03-18", "JANE CITIZEN RENT", 200.0);
        let suggestions = suggest_matches(&conn, tx).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, "participant");
        assert_eq!(suggestions[0].confidence, 70);
    }

    #[test]
    fn test_suggest_debit_matches_owner_payment() {
        let (_dir, conn) = test_db();
        let account = add_account(&conn);
        conn.execute("INSERT INTO owners (name) VALUES ('J. Chen')", []).unwrap();
        let owner = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO owner_payments (owner_id, amount, status) VALUES (?1, 1800.0, 'pending')",
            [owner],
        )
        .unwrap();
        let tx = add_tx(&conn, account, "2025-03-05", "TRANSFER TO CHEN", -1800.0);
        let suggestions = suggest_matches(&conn, tx).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, "owner_payment");
        assert_eq!(suggestions[0].confidence, 80);
        assert_eq!(suggestions[0].description, "Payment to J. Chen");
    }

    #[test]
    fn test_suggest_caps_at_five_sorted_descending() {
        let (_dir, conn) = test_db();
        let account = add_account(&conn);
        for i in 0..8 {
            // All within 1% amount; dates fan out so confidences differ.
            let date = format!("2025-03-{:02}", 15 + i);
            add_obligation(&conn, "sda_income", None, 500.0, &date);
        }
        let tx = add_tx(&conn, account, "2025-03-15", "DEPOSIT", 500.0);
        let suggestions = suggest_matches(&conn, tx).unwrap();
        assert_eq!(suggestions.len(), 5);
        for pair in suggestions.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        assert_eq!(suggestions[0].confidence, 80);
    }

    #[test]
    fn test_suggest_does_not_mutate() {
        let (_dir, conn) = test_db();
        let account = add_account(&conn);
        add_obligation(&conn, "sda_income", None, 500.0, "2025-03-15");
        let tx = add_tx(&conn, account, "2025-03-15", "DEPOSIT", 500.0);
        suggest_matches(&conn, tx).unwrap();
        let (status, ep_id, _, confidence, _) = tx_row(&conn, tx);
        assert_eq!(status, "unmatched");
        assert_eq!(ep_id, None);
        assert_eq!(confidence, None);
        let ob_status: String = conn
            .query_row("SELECT status FROM expected_payments", [], |r| r.get(0))
            .unwrap();
        assert_eq!(ob_status, "pending");
    }

    #[test]
    fn test_suggest_missing_transaction_is_not_found() {
        let (_dir, conn) = test_db();
        let err = suggest_matches(&conn, 999).unwrap_err();
        assert!(matches!(err, HavenError::NotFound("transaction", 999)));
    }
}
