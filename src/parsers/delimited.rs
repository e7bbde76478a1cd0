//! Delimited (CSV/TSV) billing export parser

use crate::services::normalizer::{find_column, normalize_column_name};
use crate::types::{
    parse_tags, BillingPeriod, CostRecord, OptiscaleError, Result, UNASSIGNED_ACCOUNT,
};
use rust_decimal::Decimal;
use std::str::FromStr;

use super::{BillingParser, ParsedBilling};

/// Positions of the recognised columns within a header row
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnMap {
    service: usize,
    amount: usize,
    account: Option<usize>,
    tags: Option<usize>,
    period: Option<usize>,
}

impl ColumnMap {
    /// Required: service and amount. Amount is claimed first so a header such
    /// as "project_cost" is not mistaken for the account column.
    fn detect(headers: &[String]) -> Result<Self> {
        let amount = find_column(headers, "amount", &["cost"], &[]).ok_or_else(|| {
            OptiscaleError::malformed(
                "missing required column 'amount' (or a column containing 'cost')",
            )
        })?;
        let service =
            find_column(headers, "service", &["service", "product"], &[amount]).ok_or_else(
                || OptiscaleError::malformed("missing required column 'service'"),
            )?;

        let mut taken = vec![amount, service];
        let account = find_column(headers, "account", &["account", "project"], &taken);
        taken.extend(account);
        let tags = find_column(headers, "tags", &["tag"], &taken);
        taken.extend(tags);
        let period = find_column(headers, "period", &["period", "date", "month"], &taken);

        Ok(Self {
            service,
            amount,
            account,
            tags,
            period,
        })
    }
}

/// Parser for comma- or tab-separated billing exports with a header row
pub struct DelimitedParser {
    name: &'static str,
    delimiter: u8,
}

impl DelimitedParser {
    pub fn csv() -> Self {
        Self {
            name: "csv",
            delimiter: b',',
        }
    }

    pub fn tsv() -> Self {
        Self {
            name: "tsv",
            delimiter: b'\t',
        }
    }

    fn parse_amount(raw: &str, line: usize) -> Result<Decimal> {
        if raw.is_empty() {
            return Err(OptiscaleError::malformed_at(line, "missing amount"));
        }
        let amount = Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .map_err(|_| {
                OptiscaleError::malformed_at(line, format!("amount is not numeric: '{}'", raw))
            })?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(OptiscaleError::malformed_at(
                line,
                format!("negative amount: {}", raw),
            ));
        }
        Ok(amount)
    }
}

impl BillingParser for DelimitedParser {
    fn name(&self) -> &str {
        self.name
    }

    fn parse_str(&self, text: &str) -> Result<ParsedBilling> {
        if text.trim().is_empty() {
            return Err(OptiscaleError::malformed("billing text is empty"));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| OptiscaleError::malformed(format!("unreadable header row: {}", e)))?
            .iter()
            .map(normalize_column_name)
            .collect();
        let columns = ColumnMap::detect(&headers)?;

        let mut records = Vec::new();
        for (idx, row) in reader.records().enumerate() {
            let fallback_line = idx + 2;
            let row = row.map_err(|e| {
                let line = e
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                OptiscaleError::malformed_at(line, e.to_string())
            })?;
            let line = row
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(fallback_line);
            let cell = |i: usize| row.get(i).unwrap_or("");
            let optional = |i: Option<usize>| i.map(cell).unwrap_or("");

            let service = cell(columns.service);
            if service.is_empty() {
                return Err(OptiscaleError::malformed_at(line, "missing service"));
            }
            let amount = Self::parse_amount(cell(columns.amount), line)?;

            let account = optional(columns.account);
            let account = if account.is_empty() {
                UNASSIGNED_ACCOUNT
            } else {
                account
            };

            records.push(CostRecord {
                service: service.to_string(),
                account_or_project: account.to_string(),
                tags: parse_tags(optional(columns.tags)),
                amount,
                period: BillingPeriod::parse(optional(columns.period)),
            });
        }

        if records.is_empty() {
            return Err(OptiscaleError::malformed("no data rows after the header"));
        }

        tracing::debug!(
            parser = self.name,
            rows = records.len(),
            amount_column = %headers[columns.amount],
            "parsed billing rows"
        );

        Ok(ParsedBilling {
            amount_column: headers[columns.amount].clone(),
            detected_columns: headers,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse(text: &str) -> Result<ParsedBilling> {
        DelimitedParser::csv().parse_str(text)
    }

    fn malformed_line(err: OptiscaleError) -> Option<usize> {
        match err {
            OptiscaleError::MalformedInput { line, .. } => line,
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }

    // ========== happy path ==========

    #[test]
    fn test_parse_minimal_columns() {
        let parsed = parse("service,amount\ncompute,100\nstorage,50\ncompute,25\n").unwrap();

        assert_eq!(parsed.records.len(), 3);
        assert_eq!(parsed.amount_column, "amount");
        assert_eq!(parsed.detected_columns, vec!["service", "amount"]);
        assert_eq!(parsed.records[0].service, "compute");
        assert_eq!(parsed.records[0].amount, dec!(100));
        assert_eq!(parsed.records[0].account_or_project, UNASSIGNED_ACCOUNT);
        assert!(parsed.records[0].tags.is_empty());
        assert!(parsed.records[0].period.is_none());
    }

    #[test]
    fn test_parse_all_optional_columns() {
        let text = "Service,Account,Tags,Period,Amount\n\
                    ec2,prod-123,\"env=prod;team=core\",2024-03,10.50\n\
                    s3,,,2024-03-02,0\n";
        let parsed = parse(text).unwrap();

        let first = &parsed.records[0];
        assert_eq!(first.account_or_project, "prod-123");
        assert_eq!(first.tags["env"], "prod");
        assert_eq!(first.tags["team"], "core");
        assert_eq!(
            first.period,
            Some(BillingPeriod::Month {
                year: 2024,
                month: 3
            })
        );
        assert_eq!(first.amount, dec!(10.50));

        let second = &parsed.records[1];
        assert_eq!(second.account_or_project, UNASSIGNED_ACCOUNT);
        assert!(second.tags.is_empty());
        assert_eq!(second.amount, Decimal::ZERO);
    }

    #[test]
    fn test_parse_provider_style_aliases() {
        let text = "Product Name,Project ID,Usage Date,Unblended Cost\n\
                    BigQuery,analytics,2024-01-31,12.34\n";
        let parsed = parse(text).unwrap();

        assert_eq!(parsed.amount_column, "unblended_cost");
        let row = &parsed.records[0];
        assert_eq!(row.service, "BigQuery");
        assert_eq!(row.account_or_project, "analytics");
        assert!(matches!(row.period, Some(BillingPeriod::Date(_))));
    }

    #[test]
    fn test_parse_quoted_fields_and_whitespace() {
        let text = "service , amount\n\"Data Transfer, Inter-Region\",  7.25 \n";
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.records[0].service, "Data Transfer, Inter-Region");
        assert_eq!(parsed.records[0].amount, dec!(7.25));
    }

    #[test]
    fn test_parse_scientific_amount() {
        let parsed = parse("service,amount\ncompute,1.5e2\n").unwrap();
        assert_eq!(parsed.records[0].amount, dec!(150));
    }

    #[test]
    fn test_parse_tsv() {
        let parsed = DelimitedParser::tsv()
            .parse_str("service\tamount\ncompute\t42\n")
            .unwrap();
        assert_eq!(parsed.records[0].amount, dec!(42));
    }

    // ========== malformed input ==========

    #[test]
    fn test_parse_empty_text() {
        assert!(matches!(
            parse("  \n "),
            Err(OptiscaleError::MalformedInput { line: None, .. })
        ));
    }

    #[test]
    fn test_parse_header_only() {
        let err = parse("service,amount\n").unwrap_err();
        assert!(err.to_string().contains("no data rows"));
    }

    #[test]
    fn test_parse_missing_amount_column() {
        let err = parse("service,region\ncompute,us-east-1\n").unwrap_err();
        assert!(err.to_string().contains("amount"));
        assert_eq!(malformed_line(err), None);
    }

    #[test]
    fn test_parse_missing_service_column() {
        let err = parse("region,amount\nus-east-1,10\n").unwrap_err();
        assert!(err.to_string().contains("service"));
    }

    #[test]
    fn test_parse_row_missing_amount() {
        let err = parse("service,amount\ncompute,100\nstorage,\n").unwrap_err();
        assert!(err.to_string().contains("missing amount"));
        assert_eq!(malformed_line(err), Some(3));
    }

    #[test]
    fn test_parse_short_row_missing_amount() {
        let err = parse("service,amount\ncompute\n").unwrap_err();
        assert_eq!(malformed_line(err), Some(2));
    }

    #[test]
    fn test_parse_row_missing_service() {
        let err = parse("service,amount\n,100\n").unwrap_err();
        assert!(err.to_string().contains("missing service"));
    }

    #[test]
    fn test_parse_non_numeric_amount() {
        let err = parse("service,amount\ncompute,12abc\n").unwrap_err();
        assert!(err.to_string().contains("not numeric"));
        assert_eq!(malformed_line(err), Some(2));
    }

    #[test]
    fn test_parse_negative_amount_rejected() {
        let err = parse("service,amount\ncompute,-5\n").unwrap_err();
        assert!(err.to_string().contains("negative amount"));
    }

    #[test]
    fn test_parse_negative_zero_accepted() {
        let parsed = parse("service,amount\ncompute,-0.00\n").unwrap();
        assert!(parsed.records[0].amount.is_zero());
    }
}
