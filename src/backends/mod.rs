// SPDX-License-Identifier: GPL-3.0-only

//! Hardware-facing backends

pub mod camera;
