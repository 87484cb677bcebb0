//! Quote
//!
//! Printable summary of a half-and-half item: one row per flavor and option, followed
//! by the price breakdown.

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{Alignment, Style, Theme, object::Columns},
};
use thiserror::Error;

use crate::{
    options::GroupKind,
    prices::{self, Price},
    pricing::PriceBreakdown,
    session::HalfHalfSession,
};

/// Errors that can occur when writing a quote.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// One row of the quote table.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRow {
    /// Flavor or option name
    pub item: String,

    /// Size or group name
    pub detail: String,

    /// Listed price
    pub price: Price,
}

/// A priced half-and-half item ready to print.
#[derive(Debug, Clone)]
pub struct Quote {
    rows: Vec<QuoteRow>,
    breakdown: PriceBreakdown,
    discount: Percentage,
}

impl Quote {
    /// Create a quote from prepared rows.
    pub fn new(rows: Vec<QuoteRow>, breakdown: PriceBreakdown, discount: Percentage) -> Self {
        Self {
            rows,
            breakdown,
            discount,
        }
    }

    /// Quote a session's current selection.
    ///
    /// Flavors are listed with their price for the chosen size, options with the
    /// modifier actually charged.
    pub fn for_session(session: &HalfHalfSession, breakdown: PriceBreakdown) -> Self {
        let config = session.config();
        let fraction = format!("1/{}", config.max_flavors);

        let mut rows = Vec::new();

        if let Some(size) = session.selected_size() {
            rows.extend(session.flavors().iter().map(|flavor| QuoteRow {
                item: format!("{fraction} {}", flavor.name),
                detail: size.label.clone(),
                price: size.price_for(flavor.uuid).unwrap_or(flavor.price),
            }));
        }

        rows.extend(session.selected_options().iter().map(|option| QuoteRow {
            item: option.name.clone(),
            detail: option.group_name.clone(),
            price: if option.kind == GroupKind::Crust && !config.allow_crust_extra_price {
                prices::zero(option.price.currency())
            } else {
                option.price
            },
        }));

        Self::new(rows, breakdown, config.discount)
    }

    /// Table rows.
    pub fn rows(&self) -> &[QuoteRow] {
        &self.rows
    }

    /// Price breakdown.
    pub fn breakdown(&self) -> &PriceBreakdown {
        &self.breakdown
    }

    /// Write the quote table and summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), QuoteError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Detail", "Price"]);

        for row in &self.rows {
            builder.push_record([row.item.clone(), row.detail.clone(), row.price.to_string()]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Columns::new(2..3), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| QuoteError::IO)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), QuoteError> {
        let breakdown = &self.breakdown;
        let discount_points = ((self.discount * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2);

        let lines = [
            ("Base:", breakdown.base.to_string()),
            ("Options:", breakdown.options.to_string()),
            ("Subtotal:", breakdown.subtotal.to_string()),
            ("Discount:", format!("({discount_points:.2}%) -{}", breakdown.discount)),
            ("Unit price:", breakdown.unit_price.to_string()),
            ("Quantity:", breakdown.quantity.to_string()),
            ("Total:", breakdown.total.to_string()),
        ];

        let label_width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = lines.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in &lines {
            writeln!(out, " {label:>label_width$}  {value:>value_width$}")
                .map_err(|_err| QuoteError::IO)?;
        }

        writeln!(out).map_err(|_err| QuoteError::IO)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::BRL};
    use testresult::TestResult;

    use crate::pricing;

    use super::*;

    fn brl(minor: i64) -> Price {
        Money::from_minor(minor, BRL)
    }

    #[test]
    fn table_lists_rows_and_summary() -> TestResult {
        let breakdown = pricing::quote(brl(60_00), brl(8_00), &Percentage::from(0.10), 2)?;
        let quote = Quote::new(
            vec![
                QuoteRow {
                    item: "1/2 Calabresa".to_string(),
                    detail: "Grande".to_string(),
                    price: brl(50_00),
                },
                QuoteRow {
                    item: "Catupiry".to_string(),
                    detail: "Borda".to_string(),
                    price: brl(8_00),
                },
            ],
            breakdown,
            Percentage::from(0.10),
        );

        let mut out = Vec::new();

        quote.write_to(&mut out)?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("1/2 Calabresa"));
        assert!(text.contains("Catupiry"));
        assert!(text.contains("(10.00%) -"));
        assert!(text.contains(&brl(122_40).to_string()));

        Ok(())
    }
}
