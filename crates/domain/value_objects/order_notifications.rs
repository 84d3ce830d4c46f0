use uuid::Uuid;

use crate::domain::value_objects::{
    enums::{delivery_types::DeliveryType, payment_methods::PaymentMethod},
    orders::OrderLine,
};

/// WhatsApp templates reject parameters with newlines, tabs or more than
/// four consecutive spaces, so every parameter goes through here.
pub fn sanitize_template_param(value: &str) -> String {
    value
        .split(|c: char| c == '\n' || c == '\r' || c == '\t' || c == ' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `1234550` -> `$12.345,50`; whole amounts drop the decimals.
pub fn format_amount(amount_minor: i64) -> String {
    let sign = if amount_minor < 0 { "-" } else { "" };
    let abs = amount_minor.unsigned_abs();
    let units = (abs / 100).to_string();
    let cents = abs % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (idx, ch) in units.chars().enumerate() {
        if idx > 0 && (units.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if cents == 0 {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}${grouped},{cents:02}")
    }
}

pub fn short_order_id(order_id: Uuid) -> String {
    order_id.simple().to_string()[..8].to_uppercase()
}

#[derive(Debug, Clone)]
pub struct OrderNotification {
    pub order_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_type: DeliveryType,
    pub address: Option<String>,
    pub eta_text: Option<String>,
    pub lines: Vec<OrderLine>,
    pub total_minor: i64,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

impl OrderNotification {
    pub fn items_detail(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                let mut text = format!("{}x {}", line.quantity, line.name);
                if !line.extras.is_empty() {
                    let extras = line
                        .extras
                        .iter()
                        .map(|extra| extra.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    text.push_str(&format!(" (+ {})", extras));
                }
                text
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn address_text(&self) -> String {
        match (self.delivery_type, self.address.as_deref()) {
            (DeliveryType::Delivery, Some(address)) if !address.trim().is_empty() => {
                address.to_string()
            }
            (DeliveryType::Delivery, _) => "Sin dirección".to_string(),
            (DeliveryType::Retiro, _) => "Retiro en local".to_string(),
        }
    }

    fn eta(&self) -> String {
        self.eta_text
            .clone()
            .unwrap_or_else(|| "a confirmar".to_string())
    }

    /// Body parameters in the order the approved template declares them:
    /// name, order id, ETA, address, items, total.
    pub fn template_parameters(&self) -> Vec<String> {
        [
            self.customer_name.clone(),
            short_order_id(self.order_id),
            self.eta(),
            self.address_text(),
            self.items_detail(),
            format_amount(self.total_minor),
        ]
        .iter()
        .map(|param| sanitize_template_param(param))
        .collect()
    }

    pub fn text_body(&self) -> String {
        let mut lines = vec![
            format!("¡Hola {}! Recibimos tu pedido #{}.", self.customer_name.trim(), short_order_id(self.order_id)),
            format!("Entrega: {}", self.address_text()),
            format!("Tiempo estimado: {}", self.eta()),
            "Detalle:".to_string(),
        ];
        for line in &self.lines {
            lines.push(format!(
                "- {}x {} {}",
                line.quantity,
                line.name,
                format_amount(line.line_total_minor())
            ));
            for extra in &line.extras {
                lines.push(format!("   + {}", extra.name));
            }
        }
        lines.push(format!("Pago: {}", self.payment_method));
        if let Some(notes) = self.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            lines.push(format!("Notas: {}", notes.trim()));
        }
        lines.push(format!("Total: {}", format_amount(self.total_minor)));
        lines.join("\n")
    }
}
