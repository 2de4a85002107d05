//! Simulated QRIS payment code for receipts. The code is an EMV-style
//! tag-length-value string carrying the order total and a reference to
//! the order id; no real payment network is involved.

const MERCHANT_NAME: &str = "CHICKENAPP";
const MERCHANT_CITY: &str = "JAKARTA";

fn tlv(tag: &str, value: &str) -> String {
    format!("{tag}{:02}{value}", value.len())
}

/// Deterministic payment payload for an order.
pub fn payment_code(order_id: i32, total_amount: i64) -> String {
    let amount = total_amount.to_string();
    let reference = format!("ORD-{order_id:06}");
    [
        tlv("00", "01"),
        tlv("01", "12"),
        tlv("52", "5812"),
        tlv("53", "360"),
        tlv("54", &amount),
        tlv("58", "ID"),
        tlv("59", MERCHANT_NAME),
        tlv("60", MERCHANT_CITY),
        tlv("62", &tlv("07", &reference)),
    ]
    .concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_deterministic() {
        assert_eq!(payment_code(42, 54000), payment_code(42, 54000));
    }

    #[test]
    fn code_carries_amount_and_order_reference() {
        let code = payment_code(42, 54000);
        assert!(code.contains("540554000"), "amount tag missing: {code}");
        assert!(code.contains("ORD-000042"), "order ref missing: {code}");
        assert!(code.contains(MERCHANT_NAME));
    }

    #[test]
    fn different_orders_produce_different_codes() {
        assert_ne!(payment_code(1, 10000), payment_code(2, 10000));
        assert_ne!(payment_code(1, 10000), payment_code(1, 20000));
    }
}
