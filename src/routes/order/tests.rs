#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;
    use uuid::Uuid;

    use crate::constants::PAGE_SIZE_CHOICES;
    use crate::order_client::can_print;
    use crate::routes::order::models::{MergeOutcome, OrderBoard};
    use crate::routes::order::receipt::{build_receipt_document, escape_html, format_address};
    use crate::routes::order::schemas::{
        MessageSender, OrderFilters, OrderStatus, Pagination, PaymentMethod, ShippingAddress,
        SortDir,
    };
    use crate::routes::order::utils::{
        allowed_transitions, can_cancel, can_ship, validate_draft,
    };
    use crate::tests::tests::{get_dummy_message, get_dummy_order};

    #[test]
    fn cod_orders_are_never_offered_paid() {
        for status in OrderStatus::ALL {
            let order = get_dummy_order(status, PaymentMethod::Cod);
            assert!(
                !allowed_transitions(&order).contains(&OrderStatus::Paid),
                "paid offered for COD order in status {}",
                status
            );
        }
    }

    #[test]
    fn shipped_is_never_in_the_generic_transition_set() {
        for status in OrderStatus::ALL {
            for method in [PaymentMethod::Wallet, PaymentMethod::Gcash, PaymentMethod::Cod] {
                let order = get_dummy_order(status, method);
                assert!(!allowed_transitions(&order).contains(&OrderStatus::Shipped));
            }
        }
    }

    #[test]
    fn pending_cod_order_offers_delivered_plus_separate_actions() {
        let order = get_dummy_order(OrderStatus::Pending, PaymentMethod::Cod);
        assert_eq!(allowed_transitions(&order), vec![OrderStatus::Delivered]);
        assert!(can_ship(&order));
        assert!(can_cancel(&order));
    }

    #[test]
    fn pending_wallet_order_offers_paid_and_delivered() {
        let order = get_dummy_order(OrderStatus::Pending, PaymentMethod::Wallet);
        assert_eq!(
            allowed_transitions(&order),
            vec![OrderStatus::Paid, OrderStatus::Delivered]
        );
    }

    #[test]
    fn terminal_states_offer_no_transitions() {
        for status in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            let order = get_dummy_order(status, PaymentMethod::Gcash);
            assert!(allowed_transitions(&order).is_empty());
            assert!(!can_cancel(&order));
            assert!(!can_ship(&order));
        }
    }

    #[test]
    fn shipped_orders_cannot_be_cancelled_or_reshipped() {
        let order = get_dummy_order(OrderStatus::Shipped, PaymentMethod::Wallet);
        assert!(!can_cancel(&order));
        assert!(!can_ship(&order));
        assert_eq!(allowed_transitions(&order), vec![OrderStatus::Delivered]);
    }

    #[test]
    fn receipts_require_at_least_a_paid_order() {
        assert!(!can_print(&get_dummy_order(
            OrderStatus::Pending,
            PaymentMethod::Wallet
        )));
        assert!(!can_print(&get_dummy_order(
            OrderStatus::Cancelled,
            PaymentMethod::Wallet
        )));
        assert!(can_print(&get_dummy_order(
            OrderStatus::Delivered,
            PaymentMethod::Cod
        )));
    }

    #[quickcheck]
    fn page_count_matches_the_ceiling_formula(total: u16, size_idx: u8) -> bool {
        let page_size = PAGE_SIZE_CHOICES[size_idx as usize % PAGE_SIZE_CHOICES.len()];
        let mut pagination = Pagination::new(page_size);
        pagination.set_total(total as u64);
        let expected =
            std::cmp::max(1, (total as u64).div_ceil(page_size as u64)) as u32;
        pagination.page_count() == expected
    }

    #[quickcheck]
    fn page_stays_in_bounds_under_arbitrary_requests(
        total: u16,
        size_idx: u8,
        requests: Vec<u8>,
    ) -> bool {
        let page_size = PAGE_SIZE_CHOICES[size_idx as usize % PAGE_SIZE_CHOICES.len()];
        let mut pagination = Pagination::new(page_size);
        pagination.set_total(total as u64);
        for request in requests {
            pagination.set_page(request as u32);
            if pagination.page() < 1 || pagination.page() > pagination.page_count() {
                return false;
            }
        }
        true
    }

    #[test]
    fn page_count_saturates_on_huge_totals() {
        let mut pagination = Pagination::new(6);
        pagination.set_total(u64::MAX);
        assert_eq!(pagination.page_count(), u32::MAX);
    }

    #[test]
    fn out_of_range_page_requests_are_no_ops() {
        let mut pagination = Pagination::new(12);
        pagination.set_total(25);
        assert_eq!(pagination.page_count(), 3);

        assert!(pagination.set_page(2));
        assert!(!pagination.set_page(5));
        assert_eq!(pagination.page(), 2);
        assert!(!pagination.set_page(0));
        assert_eq!(pagination.page(), 2);
    }

    #[test]
    fn paging_is_a_no_op_at_the_boundaries() {
        let mut pagination = Pagination::new(12);
        pagination.set_total(25);

        assert!(!pagination.prev_page());
        assert_eq!(pagination.page(), 1);
        assert!(pagination.next_page());
        assert!(pagination.next_page());
        assert!(!pagination.next_page());
        assert_eq!(pagination.page(), 3);
    }

    #[test]
    fn shrinking_totals_pull_the_page_back_into_range() {
        let mut pagination = Pagination::new(12);
        pagination.set_total(100);
        assert!(pagination.set_page(8));
        pagination.set_total(25);
        assert_eq!(pagination.page(), 3);
        pagination.set_total(0);
        assert_eq!(pagination.page_count(), 1);
        assert_eq!(pagination.page(), 1);
    }

    #[test]
    fn changing_filters_resets_the_page() {
        let mut board = OrderBoard::new();
        let generation = board.next_generation();
        let orders = (0..5)
            .map(|_| get_dummy_order(OrderStatus::Pending, PaymentMethod::Wallet))
            .collect();
        board.apply_fetch(generation, orders, 60);
        assert!(board.pagination_mut().set_page(3));

        let changed = board.set_filters(OrderFilters {
            payment_method: Some(PaymentMethod::Cod),
            ..OrderFilters::default()
        });
        assert!(changed);
        assert_eq!(board.pagination().page(), 1);

        // Re-applying the same filters leaves the page alone.
        assert!(board.pagination_mut().set_page(2));
        let changed = board.set_filters(OrderFilters {
            payment_method: Some(PaymentMethod::Cod),
            ..OrderFilters::default()
        });
        assert!(!changed);
        assert_eq!(board.pagination().page(), 2);
    }

    #[test]
    fn search_updates_bump_the_epoch_and_reset_the_page() {
        let mut board = OrderBoard::new();
        let first = board.set_search(Some("bamboo".to_string()));
        let second = board.set_search(Some("bamboo org".to_string()));
        assert!(second > first);
        assert_eq!(board.pagination().page(), 1);
        assert_eq!(board.search_epoch(), second);
    }

    #[test]
    fn duplicate_messages_are_merged_exactly_once() {
        let mut board = OrderBoard::new();
        let order = get_dummy_order(OrderStatus::Pending, PaymentMethod::Wallet);
        let order_id = order.id;
        board.insert(order);

        let message = get_dummy_message(MessageSender::Customer, "Can you ship tomorrow?");
        assert_eq!(
            board.merge_agreement_message(order_id, message.clone()),
            MergeOutcome::Appended
        );
        assert_eq!(
            board.merge_agreement_message(order_id, message),
            MergeOutcome::Duplicate
        );
        assert_eq!(board.get(order_id).unwrap().agreement_messages.len(), 1);
    }

    #[test]
    fn messages_differing_in_any_field_are_distinct() {
        let mut board = OrderBoard::new();
        let order = get_dummy_order(OrderStatus::Pending, PaymentMethod::Wallet);
        let order_id = order.id;
        board.insert(order);

        let message = get_dummy_message(MessageSender::Customer, "Can you ship tomorrow?");
        let mut other_sender = message.clone();
        other_sender.sender = MessageSender::Vendor;
        let mut other_text = message.clone();
        other_text.message = "Can you ship today?".to_string();

        assert_eq!(
            board.merge_agreement_message(order_id, message),
            MergeOutcome::Appended
        );
        assert_eq!(
            board.merge_agreement_message(order_id, other_sender),
            MergeOutcome::Appended
        );
        assert_eq!(
            board.merge_agreement_message(order_id, other_text),
            MergeOutcome::Appended
        );
        assert_eq!(board.get(order_id).unwrap().agreement_messages.len(), 3);
    }

    #[test]
    fn open_chat_orders_survive_list_refreshes() {
        let mut board = OrderBoard::new();
        let chat_order = get_dummy_order(OrderStatus::Pending, PaymentMethod::Wallet);
        let chat_order_id = chat_order.id;
        board.insert(chat_order);

        // A later page fetch that does not contain the chat order.
        let generation = board.next_generation();
        let page = vec![get_dummy_order(OrderStatus::Paid, PaymentMethod::Gcash)];
        assert!(board.apply_fetch(generation, page, 1));

        let message = get_dummy_message(MessageSender::Customer, "Still there?");
        assert_eq!(
            board.merge_agreement_message(chat_order_id, message),
            MergeOutcome::Appended
        );
        assert_eq!(
            board
                .get(chat_order_id)
                .unwrap()
                .agreement_messages
                .len(),
            1
        );
    }

    #[test]
    fn page_refreshes_replace_only_the_previous_page() {
        let mut board = OrderBoard::new();
        let first = vec![get_dummy_order(OrderStatus::Pending, PaymentMethod::Wallet)];
        let evicted_id = first[0].id;
        let generation = board.next_generation();
        assert!(board.apply_fetch(generation, first, 1));

        let second = vec![get_dummy_order(OrderStatus::Paid, PaymentMethod::Cod)];
        let kept_id = second[0].id;
        let generation = board.next_generation();
        assert!(board.apply_fetch(generation, second, 1));

        assert!(board.get(evicted_id).is_none());
        assert!(board.get(kept_id).is_some());
        assert_eq!(board.page_orders().len(), 1);
    }

    #[test]
    fn events_for_unloaded_orders_are_discarded() {
        let mut board = OrderBoard::new();
        let message = get_dummy_message(MessageSender::Customer, "hello?");
        assert_eq!(
            board.merge_agreement_message(Uuid::new_v4(), message),
            MergeOutcome::UnknownOrder
        );
    }

    #[test]
    fn stale_fetches_never_overwrite_newer_pages() {
        let mut board = OrderBoard::new();
        let older = board.next_generation();
        let newer = board.next_generation();

        let newer_order = get_dummy_order(OrderStatus::Paid, PaymentMethod::Wallet);
        let newer_id = newer_order.id;
        assert!(board.apply_fetch(newer, vec![newer_order], 1));

        let stale_order = get_dummy_order(OrderStatus::Pending, PaymentMethod::Cod);
        assert!(!board.apply_fetch(older, vec![stale_order], 40));

        assert!(board.get(newer_id).is_some());
        assert_eq!(board.pagination().total(), 1);
    }

    #[test]
    fn status_updates_are_serialized_per_order() {
        let mut board = OrderBoard::new();
        let order_id = Uuid::new_v4();
        assert!(board.begin_status_update(order_id));
        assert!(!board.begin_status_update(order_id));
        // Other orders are fully independent.
        assert!(board.begin_status_update(Uuid::new_v4()));
        board.finish_status_update(order_id);
        assert!(board.begin_status_update(order_id));
    }

    #[test]
    fn one_message_send_in_flight_per_order() {
        let mut board = OrderBoard::new();
        let order_id = Uuid::new_v4();
        assert!(board.begin_send(order_id));
        assert!(!board.begin_send(order_id));
        board.finish_send(order_id);
        assert!(board.begin_send(order_id));
    }

    #[test]
    fn empty_drafts_are_rejected_before_any_request() {
        assert_eq!(validate_draft("   "), None);
        assert_eq!(validate_draft(""), None);
        assert_eq!(validate_draft("  deal  "), Some("deal"));
    }

    #[test]
    fn markup_in_customer_data_renders_as_literal_text() {
        let mut order = get_dummy_order(OrderStatus::Paid, PaymentMethod::Wallet);
        order.customer_name = "<script>alert('x')</script>".to_string();
        let document = build_receipt_document(std::slice::from_ref(&order), "Tindahan");
        assert!(!document.contains("<script>alert"));
        assert!(document.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn escape_covers_the_five_significant_characters() {
        assert_eq!(
            escape_html(r#"&<>"'"#),
            "&amp;&lt;&gt;&quot;&#39;".to_string()
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn addresses_skip_empty_parts() {
        let address = ShippingAddress {
            street: "123 Mabini St".to_string(),
            barangay: String::new(),
            city: "Quezon City".to_string(),
            province: String::new(),
            zip: "1100".to_string(),
        };
        assert_eq!(format_address(&address), "123 Mabini St, Quezon City, 1100");
        assert_eq!(format_address(&ShippingAddress::default()), "N/A");
    }

    #[test]
    fn line_totals_are_recomputed_from_price_and_quantity() {
        let order = get_dummy_order(OrderStatus::Paid, PaymentMethod::Gcash);
        let document = build_receipt_document(std::slice::from_ref(&order), "Tindahan");
        // 3 x 19.99
        assert!(document.contains("₱59.97"));
        // subtotal = 450.00 + 50.00
        assert!(document.contains("Subtotal: ₱500.00"));
        assert!(document.contains("Shipping Fee: ₱50.00"));
    }

    #[test]
    fn batch_receipts_get_one_section_per_order() {
        let orders = vec![
            get_dummy_order(OrderStatus::Paid, PaymentMethod::Wallet),
            get_dummy_order(OrderStatus::Delivered, PaymentMethod::Cod),
        ];
        let document = build_receipt_document(&orders, "Tindahan");
        assert_eq!(document.matches(r#"<section class="receipt">"#).count(), 2);
        assert!(document.contains("page-break-after: always"));
        assert!(document.contains("window.print()"));
    }

    #[test]
    fn default_filters_sort_newest_first() {
        let filters = OrderFilters::default();
        assert_eq!(filters.sort, SortDir::Desc);
    }
}
