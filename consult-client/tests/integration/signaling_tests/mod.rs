pub mod test_candidate_before_offer;
pub mod test_outbox_preserves_order;
pub mod test_polling_survives_transport_errors;
