//! Receipt

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    checkout::CheckoutSummary,
    content::Locale,
    pricing::{CartValuation, DetailedItem},
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// A line total did not fit in minor units.
    #[error("line {0} total overflowed")]
    Overflow(usize),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable breakdown of a valued cart and its checkout amounts.
#[derive(Debug, Clone)]
pub struct Receipt<'v, 'a> {
    valuation: &'v CartValuation<'a>,
    summary: CheckoutSummary<'a>,
    locale: Locale,
    voucher: Option<String>,
}

impl<'v, 'a> Receipt<'v, 'a> {
    /// Create a receipt for a valuation and its checkout summary.
    pub fn new(valuation: &'v CartValuation<'a>, summary: CheckoutSummary<'a>, locale: Locale) -> Self {
        Self {
            valuation,
            summary,
            locale,
            voucher: None,
        }
    }

    /// Label the discount line with the applied voucher.
    #[must_use]
    pub fn with_voucher(mut self, description: impl Into<String>) -> Self {
        self.voucher = Some(description.into());
        self
    }

    /// Writes the receipt table and summary.
    ///
    /// # Errors
    ///
    /// Returns an error if a line total overflows or the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Unit Price", "Qty", "Line Total"]);

        for (idx, item) in self.valuation.detailed_items().iter().enumerate() {
            builder.push_record(self.item_row(idx, item)?);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Alignment::center());
        table.modify(Columns::new(2..), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        self.write_summary(&mut out)
    }

    fn item_row(&self, idx: usize, item: &DetailedItem<'a>) -> Result<[String; 5], ReceiptError> {
        let position = (idx + 1).to_string();

        let Some(product) = item.product.as_ref() else {
            return Ok([
                position,
                "(removed from menu)".to_string(),
                String::new(),
                format!("0 of {}", item.requested_quantity),
                "unavailable".to_string(),
            ]);
        };

        let name = product.name.get(self.locale).to_string();

        if !item.is_available() {
            return Ok([
                position,
                name,
                product.price.to_string(),
                format!("0 of {}", item.requested_quantity),
                "unavailable".to_string(),
            ]);
        }

        let line_total = product
            .price
            .to_minor_units()
            .checked_mul(i64::from(item.quantity))
            .ok_or(ReceiptError::Overflow(idx))?;

        Ok([
            position,
            name,
            product.price.to_string(),
            item.quantity.to_string(),
            Money::from_minor(line_total, product.price.currency()).to_string(),
        ])
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let discount_label = match &self.voucher {
            Some(voucher) => format!("Discount ({voucher}):"),
            None => "Discount:".to_string(),
        };

        let lines = [
            ("Subtotal:".to_string(), self.summary.subtotal, false),
            ("Shipping:".to_string(), self.summary.shipping_fee, false),
            (discount_label, self.summary.discount, true),
            ("Total:".to_string(), self.summary.total, false),
        ];

        let label_width = lines.iter().map(|(label, ..)| label.chars().count()).max().unwrap_or(0);
        let value_width = lines
            .iter()
            .map(|(_, value, negative)| display_amount(*value, *negative).chars().count())
            .max()
            .unwrap_or(0);

        for (label, value, negative) in &lines {
            writeln!(
                out,
                " {label:>label_width$}  {:>value_width$}",
                display_amount(*value, *negative)
            )
            .map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

fn display_amount(value: Money<'_, Currency>, negative: bool) -> String {
    if negative && value.to_minor_units() != 0 {
        format!("-{value}")
    } else {
        value.to_string()
    }
}
