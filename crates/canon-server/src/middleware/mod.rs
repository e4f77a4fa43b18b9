// SPDX-License-Identifier: Apache-2.0

pub(crate) mod body_limit;
pub(crate) mod request_tracing;
