use std::str::FromStr;

use chrono::NaiveDate;
use itertools::izip;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};
use tracing::{debug, info};

use super::{
    account::AccountTranslation,
    error::{Error, Result},
    table::Table,
};

/// Date layout used by Mint exports.
pub const MINT_DATE_FORMAT: &str = "%m/%d/%Y";
/// Date layout expected by Monarch imports.
pub const MONARCH_DATE_FORMAT: &str = "%Y-%m-%d";

const DEBIT: &str = "debit";

/// One row of a Monarch import file, in Monarch's column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonarchTransaction {
    pub date: Option<NaiveDate>,
    pub merchant: String,
    pub category: String,
    pub account: String,
    #[serde(rename = "Original Statement")]
    pub original_statement: String,
    pub notes: String,
    pub amount: Option<Decimal>,
    pub tags: String,
}

impl MonarchTransaction {
    pub const HEADERS: [&'static str; 8] = [
        "Date",
        "Merchant",
        "Category",
        "Account",
        "Original Statement",
        "Notes",
        "Amount",
        "Tags",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.date
                .map(|date| date.format(MONARCH_DATE_FORMAT).to_string())
                .unwrap_or_default(),
            self.merchant.clone(),
            self.category.clone(),
            self.account.clone(),
            self.original_statement.clone(),
            self.notes.clone(),
            self.amount.map(|amount| amount.to_string()).unwrap_or_default(),
            self.tags.clone(),
        ]
    }
}

/// Positions of the Mint columns the conversion reads.
struct MintColumns {
    date: usize,
    transaction_type: usize,
    amount: usize,
    description: usize,
    original_description: usize,
    account_name: usize,
    category: usize,
    notes: usize,
    labels: usize,
}

impl MintColumns {
    fn resolve(table: &Table) -> Result<Self> {
        Ok(Self {
            date: table.column("Date")?,
            transaction_type: table.column("Transaction Type")?,
            amount: table.column("Amount")?,
            description: table.column("Description")?,
            original_description: table.column("Original Description")?,
            account_name: table.column("Account Name")?,
            category: table.column("Category")?,
            notes: table.column("Notes")?,
            labels: table.column("Labels")?,
        })
    }
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or_default()
}

/// Parses a Mint `MM/DD/YYYY` date, yielding `None` rather than failing.
pub fn parse_mint_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), MINT_DATE_FORMAT).ok()
}

/// Parses an amount cell. A blank cell has no amount.
fn parse_amount(value: &str) -> std::result::Result<Option<Decimal>, rust_decimal::Error> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(value).map(Some)
}

/// Negates debits. Zero is always written without a sign.
fn signed_amount(kind: &str, amount: Decimal) -> Decimal {
    let signed = if kind == DEBIT { -amount } else { amount };
    if signed.is_zero() {
        signed.abs()
    } else {
        signed
    }
}

/// Converts a loaded Mint export into Monarch rows.
///
/// Every input row produces exactly one output row, in the same order.
/// Dates that do not parse and blank amounts become `None`. Amounts of
/// `debit` rows are negated. When a translation is given, account names found in it are
/// replaced and the others are kept, unless the translation is strict.
pub fn transform(
    table: &Table,
    translation: Option<&AccountTranslation>,
) -> Result<Vec<MonarchTransaction>> {
    let columns = MintColumns::resolve(table)?;
    let rows = table.rows();

    info!("converting dates from MM/DD/YYYY to YYYY-MM-DD");
    let dates: Vec<Option<NaiveDate>> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let raw = cell(row, columns.date);
            let date = parse_mint_date(raw);
            if date.is_none() {
                debug!(line = index + 2, value = raw, "unparseable date");
            }
            date
        })
        .collect();

    info!("adjusting amounts based on transaction type");
    let amounts = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let raw = cell(row, columns.amount);
            let amount = parse_amount(raw).map_err(|_| Error::InvalidAmount {
                line: index + 2,
                value: raw.to_owned(),
            })?;
            let kind = cell(row, columns.transaction_type);
            Ok(amount.map(|amount| signed_amount(kind, amount)))
        })
        .collect::<Result<Vec<_>>>()?;

    let accounts = match translation {
        Some(translation) => {
            info!(accounts = translation.len(), "translating account names");
            rows.iter()
                .map(|row| translation.translate(cell(row, columns.account_name)))
                .collect::<Result<Vec<_>>>()?
        }
        None => rows
            .iter()
            .map(|row| cell(row, columns.account_name).to_owned())
            .collect(),
    };

    info!("dropping and renaming columns to match the Monarch layout");
    let transactions = izip!(rows, dates, amounts, accounts)
        .map(|(row, date, amount, account)| MonarchTransaction {
            date,
            merchant: cell(row, columns.description).to_owned(),
            category: cell(row, columns.category).to_owned(),
            account,
            original_statement: cell(row, columns.original_description).to_owned(),
            notes: cell(row, columns.notes).to_owned(),
            amount,
            tags: cell(row, columns.labels).to_owned(),
        })
        .collect();

    Ok(transactions)
}

/// Renders the first `limit` transactions as a text table.
pub fn preview<'a>(
    transactions: impl IntoIterator<Item = &'a MonarchTransaction>,
    limit: usize,
) -> String {
    let mut builder = Builder::default();
    builder.push_record(MonarchTransaction::HEADERS.map(String::from));
    for transaction in transactions.into_iter().take(limit) {
        builder.push_record(transaction.cells());
    }

    let mut table = builder.build();
    table.with(Style::psql());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal_macros::dec;

    use super::*;

    const MINT_HEADERS: [&str; 9] = [
        "Date",
        "Description",
        "Original Description",
        "Amount",
        "Transaction Type",
        "Category",
        "Account Name",
        "Labels",
        "Notes",
    ];

    fn mint_row(date: &str, amount: &str, kind: &str, merchant: &str, account: &str) -> Vec<String> {
        vec![
            date.into(),
            merchant.into(),
            merchant.to_uppercase(),
            amount.into(),
            kind.into(),
            "Food".into(),
            account.into(),
            "".into(),
            "".into(),
        ]
    }

    fn mint_table(rows: Vec<Vec<String>>) -> Table {
        Table::new(MINT_HEADERS.map(String::from).to_vec(), rows)
    }

    #[test]
    fn converts_debit_row_to_monarch() {
        let table = mint_table(vec![mint_row(
            "03/15/2023",
            "50.00",
            "debit",
            "Coffee Shop",
            "Checking",
        )]);

        let transactions = transform(&table, None).unwrap();

        assert_eq!(
            transactions,
            vec![MonarchTransaction {
                date: NaiveDate::from_ymd_opt(2023, 3, 15),
                merchant: "Coffee Shop".into(),
                category: "Food".into(),
                account: "Checking".into(),
                original_statement: "COFFEE SHOP".into(),
                notes: "".into(),
                amount: Some(dec!(-50.00)),
                tags: "".into(),
            }]
        );
        assert_eq!(transactions[0].amount.unwrap().to_string(), "-50.00");
    }

    #[test]
    fn only_exact_debit_is_negated() {
        let table = mint_table(vec![
            mint_row("01/01/2024", "10.5", "credit", "Payroll", "Checking"),
            mint_row("01/02/2024", "10.5", "Debit", "Shop", "Checking"),
            mint_row("01/03/2024", "10.5", "debit", "Shop", "Checking"),
        ]);

        let amounts: Vec<_> = transform(&table, None)
            .unwrap()
            .into_iter()
            .map(|tx| tx.amount)
            .collect();

        assert_eq!(
            amounts,
            vec![Some(dec!(10.5)), Some(dec!(10.5)), Some(dec!(-10.5))]
        );
    }

    #[test]
    fn unparseable_dates_become_none() {
        let table = mint_table(vec![
            mint_row("2023-03-15", "1", "credit", "A", "Checking"),
            mint_row("", "1", "credit", "B", "Checking"),
            mint_row("02/30/2023", "1", "credit", "C", "Checking"),
            mint_row("12/31/1999", "1", "credit", "D", "Checking"),
        ]);

        let dates: Vec<_> = transform(&table, None)
            .unwrap()
            .into_iter()
            .map(|tx| tx.date)
            .collect();

        assert_eq!(
            dates,
            vec![None, None, None, NaiveDate::from_ymd_opt(1999, 12, 31)]
        );
    }

    #[test]
    fn preserves_row_count_and_order() {
        let rows: Vec<_> = (0..25)
            .map(|i| mint_row("01/01/2024", &i.to_string(), "credit", "M", "Savings"))
            .collect();
        let table = mint_table(rows);

        let transactions = transform(&table, None).unwrap();

        assert_eq!(transactions.len(), table.len());
        for (i, tx) in transactions.iter().enumerate() {
            assert_eq!(tx.amount, Some(Decimal::from(i)));
        }
    }

    #[test]
    fn translates_known_accounts_and_passes_others_through() {
        let table = mint_table(vec![
            mint_row("01/01/2024", "1", "credit", "A", "CHK 1234"),
            mint_row("01/01/2024", "1", "credit", "B", "Visa"),
        ]);
        let translation =
            AccountTranslation::from(HashMap::from([("CHK 1234".to_owned(), "Checking".to_owned())]));

        let accounts: Vec<_> = transform(&table, Some(&translation))
            .unwrap()
            .into_iter()
            .map(|tx| tx.account)
            .collect();

        assert_eq!(accounts, vec!["Checking", "Visa"]);
    }

    #[test]
    fn identity_translation_changes_nothing() {
        let table = mint_table(vec![
            mint_row("01/01/2024", "1", "debit", "A", "CHK 1234"),
            mint_row("01/01/2024", "2", "credit", "B", "Visa"),
        ]);
        let identity = AccountTranslation::from(HashMap::from([
            ("CHK 1234".to_owned(), "CHK 1234".to_owned()),
            ("Visa".to_owned(), "Visa".to_owned()),
        ]));

        assert_eq!(
            transform(&table, Some(&identity)).unwrap(),
            transform(&table, None).unwrap()
        );
    }

    #[test]
    fn strict_translation_rejects_unmapped_accounts() {
        let table = mint_table(vec![mint_row("01/01/2024", "1", "credit", "A", "Visa")]);
        let translation = AccountTranslation::from(HashMap::new()).strict();

        assert_eq!(
            transform(&table, Some(&translation)),
            Err(Error::UnmappedAccount {
                account: "Visa".into()
            })
        );
    }

    #[test]
    fn missing_column_is_reported() {
        let table = Table::new(
            vec!["Date".into(), "Transaction Type".into(), "Amount".into()],
            vec![],
        );

        assert_eq!(
            transform(&table, None),
            Err(Error::MissingColumn {
                column: "Description"
            })
        );
    }

    #[test]
    fn blank_amount_keeps_the_row() {
        let table = mint_table(vec![
            mint_row("01/01/2024", "", "debit", "A", "Visa"),
            mint_row("01/02/2024", "  ", "credit", "B", "Visa"),
            mint_row("01/03/2024", "3.00", "debit", "C", "Visa"),
        ]);

        let transactions = transform(&table, None).unwrap();

        let amounts: Vec<_> = transactions.iter().map(|tx| tx.amount).collect();
        assert_eq!(amounts, vec![None, None, Some(dec!(-3.00))]);
        assert_eq!(transactions[0].merchant, "A");
    }

    #[test]
    fn zero_debit_has_no_negative_sign() {
        let table = mint_table(vec![mint_row("01/01/2024", "0.00", "debit", "A", "Visa")]);

        let transactions = transform(&table, None).unwrap();

        assert_eq!(transactions[0].amount.unwrap().to_string(), "0.00");
    }

    #[test]
    fn invalid_amount_reports_line() {
        let table = mint_table(vec![
            mint_row("01/01/2024", "1", "credit", "A", "Visa"),
            mint_row("01/01/2024", "lots", "credit", "A", "Visa"),
        ]);

        assert_eq!(
            transform(&table, None),
            Err(Error::InvalidAmount {
                line: 3,
                value: "lots".into()
            })
        );
    }

    #[test]
    fn preview_is_limited() {
        let rows: Vec<_> = (0..3)
            .map(|i| mint_row("01/01/2024", "1", "credit", &format!("Merchant {i}"), "Visa"))
            .collect();
        let transactions = transform(&mint_table(rows), None).unwrap();

        let rendered = preview(&transactions, 2);

        assert!(rendered.contains("Original Statement"));
        assert!(rendered.contains("Merchant 1"));
        assert!(!rendered.contains("Merchant 2"));
    }
}
