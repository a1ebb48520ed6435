#[cfg(test)]
pub mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    use crate::routes::order::schemas::{
        AgreementMessage, MessageSender, Order, OrderItem, OrderStatus, PaymentMethod,
        PaymentStatus, ShippingAddress,
    };

    pub fn get_dummy_item(name: &str, quantity: u32, unit_price: &str) -> OrderItem {
        OrderItem {
            name: name.to_owned(),
            label: Some("Large".to_owned()),
            quantity,
            unit_price: BigDecimal::from_str(unit_price).unwrap(),
            image_url: None,
        }
    }

    pub fn get_dummy_address() -> ShippingAddress {
        ShippingAddress {
            street: "123 Mabini St".to_owned(),
            barangay: "Poblacion".to_owned(),
            city: "Quezon City".to_owned(),
            province: "Metro Manila".to_owned(),
            zip: "1100".to_owned(),
        }
    }

    pub fn get_dummy_order(status: OrderStatus, payment_method: PaymentMethod) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_id: "ORD-0001".to_owned(),
            status,
            payment_method,
            payment_status: PaymentStatus::Unpaid,
            sub_total: BigDecimal::from_str("450.00").unwrap(),
            shipping_fee: BigDecimal::from_str("50.00").unwrap(),
            gross_amount: BigDecimal::from_str("500.00").unwrap(),
            commission_amount: BigDecimal::from_str("25.00").unwrap(),
            tracking_number: None,
            customer_name: "Juan Dela Cruz".to_owned(),
            shipping_address: get_dummy_address(),
            items: vec![get_dummy_item("Bamboo Organizer", 3, "19.99")],
            agreement_details: Some("Please pack items separately".to_owned()),
            agreement_messages: vec![],
            created_on: Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap(),
            updated_on: None,
        }
    }

    pub fn get_dummy_message(sender: MessageSender, text: &str) -> AgreementMessage {
        AgreementMessage {
            sender,
            message: text.to_owned(),
            timestamp: fixed_timestamp(),
        }
    }

    pub fn fixed_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, 10, 0, 0).unwrap()
    }
}
