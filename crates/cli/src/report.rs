use billshare_core::{BillMatch, DuplicateWarning, Money, OccupantShare};
use billshare_import::{ParseError, ParsedStatement, SplitOutcome};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Serialize)]
pub struct BillLine<'a> {
    #[serde(flatten)]
    pub bill: &'a BillMatch,
    pub shares: Vec<OccupantShare>,
    /// `None` when the amount is too large to total the shares.
    pub residual: Option<Money>,
}

#[derive(Debug, Serialize)]
pub struct SplitReport<'a> {
    pub bills: Vec<BillLine<'a>>,
    pub duplicates: &'a [DuplicateWarning],
    pub parse_errors: &'a [ParseError],
}

impl<'a> SplitReport<'a> {
    pub fn new(outcome: &'a SplitOutcome, parse_errors: &'a [ParseError], labels: &[String]) -> Self {
        let bills = outcome
            .matches
            .iter()
            .map(|bill| BillLine {
                bill,
                shares: bill.shares(labels),
                residual: bill.residual(),
            })
            .collect();
        SplitReport {
            bills,
            duplicates: &outcome.duplicates,
            parse_errors,
        }
    }
}

pub fn render_statement(parsed: &ParsedStatement) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Parsed {} transactions ({} lines skipped, {} errors)\n",
        parsed.records.len(),
        parsed.skipped_lines,
        parsed.errors.len()
    );
    for r in &parsed.records {
        let _ = writeln!(
            out,
            "{} {:>12} {:>12}  {}",
            r.date, r.amount, r.running_balance, r.description
        );
    }
    render_parse_errors(&mut out, &parsed.errors);
    out
}

pub fn render_split(report: &SplitReport<'_>) -> String {
    let mut out = String::new();
    if report.bills.is_empty() {
        let _ = writeln!(out, "No bills matched.");
    }
    for line in &report.bills {
        let bill = line.bill;
        let _ = writeln!(
            out,
            "{} {} | {} paid on {} | {} each",
            bill.period(),
            bill.merchant_name(),
            bill.total_amount(),
            bill.transaction_date(),
            bill.split_amount()
        );
        for share in &line.shares {
            let _ = writeln!(out, "    {:<20} {}", share.occupant, share.amount);
        }
        match line.residual {
            Some(residual) if !residual.is_zero() => {
                let _ = writeln!(out, "    residual absorbed by payer: {residual}");
            }
            Some(_) => {}
            None => {
                let _ = writeln!(out, "    residual unavailable: amount too large");
            }
        }
    }

    if !report.duplicates.is_empty() {
        let _ = writeln!(out, "\nNeeds review ({}):", report.duplicates.len());
        for warning in report.duplicates {
            let _ = writeln!(out, "  {warning}");
        }
    }
    render_parse_errors(&mut out, report.parse_errors);
    out
}

fn render_parse_errors(out: &mut String, errors: &[ParseError]) {
    if errors.is_empty() {
        return;
    }
    let _ = writeln!(out, "\nUnparsed lines ({}):", errors.len());
    for e in errors {
        let _ = writeln!(out, "  {e}");
    }
}
