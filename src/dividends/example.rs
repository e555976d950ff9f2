use crate::error::NormalizeError;
use crate::flex::Statement;

use super::{Dividend, normalize};

const EXAMPLE_STATEMENT: &str = r#"<FlexQueryResponse queryName="Daily Dividends" type="AF">
    <FlexStatements count="1">
        <FlexStatement accountId="" fromDate="20250715" toDate="20250715" period="LastBusinessDay" whenGenerated="20250716;210552">
            <ChangeInDividendAccruals>
                <ChangeInDividendAccrual currency="USD" fxRateToBase="0.86192" symbol="ARE" description="ALEXANDRIA REAL ESTATE EQUIT" date="20250715" exDate="20250630" payDate="20250715" tax="-4.95" fee="0" grossAmount="-33" netAmount="-28.05" />
                <ChangeInDividendAccrual currency="USD" fxRateToBase="0.86192" symbol="O" description="REALTY INCOME CORP" date="20250715" exDate="20250701" payDate="20250715" tax="-4.04" fee="0" grossAmount="-26.9" netAmount="-22.86" />
            </ChangeInDividendAccruals>
        </FlexStatement>
    </FlexStatements>
</FlexQueryResponse>"#;

/// Built-in statement used when the Flex service is not configured or fails.
pub fn example_statement() -> Statement {
    Statement::new(EXAMPLE_STATEMENT)
}

pub fn example_dividends() -> Result<Vec<Dividend>, NormalizeError> {
    normalize(&example_statement())
}
