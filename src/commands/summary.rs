use crate::commands::sync::sync_plan;
use crate::commands::Out;
use crate::engine::{days_until_payday, summarize, DebtSummary};
use crate::{Config, Result};
use chrono::Utc;

/// Builds the debt summary for the plan.
///
/// The carryover sync pass runs first so that derived debt state (missed
/// cycles, overdue expenses, stale expense debts) is current before the
/// partition is computed.
pub async fn summary(config: &Config) -> Result<Out<DebtSummary>> {
    let now = Utc::now();
    sync_plan(config, &[], now).await?;

    let debts = config.db().list_debts().await?;
    let summary = summarize(&debts);
    let payday_in = days_until_payday(now.date_naive(), config.pay_date());
    let message = format!(
        "{} active debt(s), {} owed in total, {} owed monthly; payday in {} day(s)",
        summary.active.len(),
        summary.total_debt_balance,
        summary.total_monthly_payments,
        payday_in
    );
    Ok(Out::new(message, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::AddDebtArgs;
    use crate::commands::add_debt;
    use crate::model::{DebtType, Money};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_summary_totals() {
        let env = TestEnv::new().await;
        let config = env.config();

        let args = AddDebtArgs::new(
            "Visa",
            DebtType::CreditCard,
            Money::from(800),
            Some(Money::from(100)),
            None,
            None,
            None,
            None,
        );
        add_debt(&config, args).await.unwrap();

        let out = summary(&config).await.unwrap();
        let summary = out.structure().unwrap();
        assert_eq!(summary.active.len(), 1);
        assert_eq!(summary.credit_cards.len(), 1);
        assert_eq!(summary.total_debt_balance, Money::from(800));
        assert_eq!(summary.total_monthly_payments, Money::from(100));
    }

    #[tokio::test]
    async fn test_empty_summary() {
        let env = TestEnv::new().await;
        let out = summary(&env.config()).await.unwrap();
        let summary = out.structure().unwrap();
        assert!(summary.active.is_empty());
        assert_eq!(summary.total_debt_balance, Money::ZERO);
    }
}
