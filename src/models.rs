#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Property {
    pub id: i64,
    pub name: String,
    pub owner_id: Option<i64>,
    pub management_fee_percent: f64,
    pub is_active: bool,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub ndis_number: String,
    pub property_id: Option<i64>,
    pub status: String,
}

impl Participant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Plan {
    pub id: i64,
    pub participant_id: i64,
    pub monthly_sda_amount: Option<f64>,
    pub annual_sda_budget: f64,
    pub claim_day: Option<u32>,
    pub rent_contribution: Option<f64>,
    pub rent_frequency: Option<String>,
    pub plan_status: String,
}

impl Plan {
    /// Monthly SDA amount: the explicit figure when set, else annual / 12.
    pub fn monthly_sda(&self) -> f64 {
        match self.monthly_sda_amount {
            Some(m) if m != 0.0 => m,
            _ => self.annual_sda_budget / 12.0,
        }
    }

    /// Rent contribution normalized to a monthly figure.
    /// Weekly is x52/12, fortnightly x26/12, monthly as-is.
    pub fn monthly_rent_contribution(&self) -> Option<f64> {
        let amount = self.rent_contribution?;
        if amount == 0.0 {
            return None;
        }
        Some(match self.rent_frequency.as_deref() {
            Some("weekly") => amount * 52.0 / 12.0,
            Some("fortnightly") => amount * 26.0 / 12.0,
            _ => amount,
        })
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct ExpectedPayment {
    pub id: i64,
    pub payment_type: String,
    pub participant_id: Option<i64>,
    pub plan_id: Option<i64>,
    pub property_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub expected_amount: f64,
    pub expected_date: String,
    pub period_month: String,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub status: String,
    pub source_type: String,
    pub received_amount: Option<f64>,
    pub received_date: Option<String>,
    pub variance: Option<f64>,
    pub matched_transaction_id: Option<i64>,
    pub notes: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct BankTransaction {
    pub id: i64,
    pub account_id: i64,
    pub date: String,
    pub description: String,
    pub reference: Option<String>,
    pub amount: f64,
    pub balance: Option<f64>,
    pub transaction_type: String,
    pub match_status: String,
    pub matched_payment_id: Option<i64>,
    pub matched_owner_payment_id: Option<i64>,
    pub matched_claim_id: Option<i64>,
    pub matched_participant_id: Option<i64>,
    pub matched_expected_payment_id: Option<i64>,
    pub match_confidence: Option<i64>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub import_source: Option<String>,
    pub import_id: Option<i64>,
}

/// Intermediate representation from a bank CSV parser before DB insert.
#[derive(Debug, Clone)]
pub struct ParsedRow {
    pub date: String,
    pub description: String,
    pub reference: Option<String>,
    pub amount: f64,
    pub balance: Option<f64>,
}
