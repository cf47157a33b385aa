use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub order_transitions_total: IntCounterVec,
    pub otp_issued_total: IntCounter,
    pub otp_verifications_total: IntCounterVec,
    pub orders_out_for_delivery: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let order_transitions_total = IntCounterVec::new(
            Opts::new(
                "order_transitions_total",
                "Successful order lifecycle transitions by kind",
            ),
            &["transition"],
        )
        .expect("valid order_transitions_total metric");

        let otp_issued_total = IntCounter::new(
            "otp_issued_total",
            "Delivery OTP challenges issued",
        )
        .expect("valid otp_issued_total metric");

        let otp_verifications_total = IntCounterVec::new(
            Opts::new(
                "otp_verifications_total",
                "Delivery OTP verification attempts by outcome",
            ),
            &["outcome"],
        )
        .expect("valid otp_verifications_total metric");

        let orders_out_for_delivery = IntGauge::new(
            "orders_out_for_delivery",
            "Orders currently out for delivery",
        )
        .expect("valid orders_out_for_delivery metric");

        registry
            .register(Box::new(order_transitions_total.clone()))
            .expect("register order_transitions_total");
        registry
            .register(Box::new(otp_issued_total.clone()))
            .expect("register otp_issued_total");
        registry
            .register(Box::new(otp_verifications_total.clone()))
            .expect("register otp_verifications_total");
        registry
            .register(Box::new(orders_out_for_delivery.clone()))
            .expect("register orders_out_for_delivery");

        Self {
            registry,
            order_transitions_total,
            otp_issued_total,
            otp_verifications_total,
            orders_out_for_delivery,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
