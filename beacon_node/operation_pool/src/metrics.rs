use crate::attestation_id::AttestationId;
use lazy_static::lazy_static;
use lighthouse_metrics::*;
use std::collections::HashMap;
use types::Attestation;

lazy_static! {
    pub static ref OP_POOL_ATTESTATION_GROUPS: Result<IntGauge> = try_create_int_gauge(
        "op_pool_attestation_groups_total",
        "Count of distinct (data, fork) attestation groups held in the operation pool"
    );
    pub static ref OP_POOL_ATTESTATIONS_TOTAL: Result<IntGauge> = try_create_int_gauge(
        "op_pool_attestations_total",
        "Count of individual attestations held in the operation pool, across all groups"
    );
}

pub fn set_counts(attestations: &HashMap<AttestationId, Vec<Attestation>>) {
    set_gauge(&OP_POOL_ATTESTATION_GROUPS, attestations.len() as i64);
    set_gauge(
        &OP_POOL_ATTESTATIONS_TOTAL,
        attestations.values().map(Vec::len).sum::<usize>() as i64,
    );
}
