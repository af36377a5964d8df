/*!
F* Runtime - native string and I/O primitives for extracted C code

Extracted programs declare `FStar_String_strlen`, `FStar_String_strcat`,
`Prims_strcat` and `FStar_HyperStack_IO_print_string` as externs; linking
against this library's staticlib resolves them.
*/

pub mod buffer;
pub mod error;
pub mod ffi;
pub mod shim;

// Re-export main types
pub use buffer::CBuf;
pub use error::{ShimError, ShimResult};
pub use shim::{Native, StringIo};

use std::sync::Once;
use tracing::Level;

static LOGGING: Once = Once::new();

/// Install a stderr logger at `WARN` (stdout belongs to `print_string`).
///
/// A subscriber already installed by the host is left in place.
///
/// # Safety
/// This function is safe to call multiple times (idempotent).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fstar_runtime_init() {
    LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(Level::WARN)
            .try_init();
    });
}
