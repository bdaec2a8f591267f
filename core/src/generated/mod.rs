//! Protobuf messages and gRPC client stubs for the ArmoniK control plane.
//!
//! Only the subset of the `armonik.api.grpc.v1` API used by this SDK is
//! declared. Unknown fields sent by the server are skipped by prost, so the
//! trimmed message definitions stay wire compatible with the full schema.

#[allow(clippy::all)]
pub mod armonik_v1;
