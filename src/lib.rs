//! # sportident
//!
//! Framing, CRC and system-data codecs for SPORTident timing stations.
//!
//! A station talks the extended serial protocol: frames carry a command, a
//! payload and a CRC16. Its configuration lives in a 128-byte system-data
//! block whose bytes are shared between many logical fields; the product
//! codecs read and write those fields without disturbing each other.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SystemData (128 bytes)                   │
//! │  ┌─────────────┐ ┌─────────────┐ ┌──────────┐ ┌──────────┐  │
//! │  │ ProductType │ │ProductString│ │  Serial  │ │ Battery  │  │
//! │  └─────────────┘ └─────────────┘ └──────────┘ └──────────┘  │
//! ├─────────────────────────────────────────────────────────────┤
//! │             Masked / indexed codec framework                │
//! ├─────────────────────────────────────────────────────────────┤
//! │      Frame parser / FrameCodec (WAKEUP STX CMD LEN CRC)     │
//! ├─────────────────────────────────────────────────────────────┤
//! │                          CRC16                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow stylistic lints that don't affect correctness
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]              // ASCII diagrams in docs
#![allow(clippy::unreadable_literal)]        // Serial numbers and product codes
#![allow(clippy::cast_possible_truncation)]  // Byte extraction from wider integers
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]             // cfg0/cfg1/cfg2 are register names
#![allow(clippy::option_if_let_else)]        // More readable in context
#![allow(clippy::use_self)]                  // Explicit type names in matches
#![allow(clippy::redundant_pub_crate)]       // Explicit visibility
#![allow(clippy::too_many_lines)]            // Complete lookup tables
#![allow(clippy::match_same_arms)]           // Explicit arm per variant is clearer
#![allow(clippy::return_self_not_must_use)]  // Builder methods don't need must_use
#![allow(clippy::ptr_arg)]                   // Codec values are owned types

pub mod codec;
pub mod config;
pub mod error;
pub mod product;
pub mod protocol;
pub mod sysdata;

pub use config::Config;
pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::codec::{Codec, EncodeOutcome, Mask, MaskedData};
    pub use crate::config::Config;
    pub use crate::error::{CodecError, Error, ProtocolError, Result};
    pub use crate::product::{Bsx8Polarity, ProductFamily, ProductType};
    pub use crate::protocol::{crc16, Command, Frame, FrameCodec, FrameParser};
    pub use crate::sysdata::{Field, SysAddr, SysDataChunk, SystemData};
}
