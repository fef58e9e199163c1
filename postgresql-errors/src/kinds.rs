use crate::error::Tag;
use crate::traits::{ErrorKind, Sealed};

/// Error is safe to retry once the enclosing transaction is restarted.
pub static SHOULD_RETRY: Tag = Tag { bit: 0 };

macro_rules! define_errors {
    ($(
        $(#[$doc:meta])*
        $id:ident = ($mask:expr, $code:literal) [$($tag:ident),*];
    )*) => {
        $(
            $(#[$doc])*
            pub struct $id;

            impl Sealed for $id {
                const CODE: u32 = $code;
                const NAME: &'static str = stringify!($id);
                fn is_superclass_of(code: u32) -> bool {
                    code & $mask == $code
                }
            }

            impl ErrorKind for $id {}
        )*

        pub(crate) fn error_name(code: u32) -> &'static str {
            match code {
                $( $code => stringify!($id), )*
                _ => "Error",
            }
        }

        fn get_tags(code: u32) -> u32 {
            #[allow(unused_mut)]
            let mut tags = 0;
            $(
                if code & $mask == $code {
                    $( tags |= 1 << $tag.bit; )*
                }
            )*
            tags
        }
    };
}

define_errors! {
    /// Error raised on the client side without a server round trip.
    ClientError = (0xFF_00_00_00, 0x01_00_00_00) [];
    /// Transport to the server is unusable.
    ConnectionError = (0xFF_FF_00_00, 0x01_01_00_00) [];
    ClientConnectionFailedError = (0xFF_FF_FF_00, 0x01_01_01_00) [];
    AuthenticationError = (0xFF_FF_FF_00, 0x01_01_02_00) [];
    ClientConnectionEosError = (0xFF_FF_FF_00, 0x01_01_03_00) [];
    ClientConnectionClosedError = (0xFF_FF_FF_00, 0x01_01_04_00) [];
    /// Statement was refused because the connection is in the middle of
    /// another request or broke earlier.
    ClientInconsistentError = (0xFF_FF_00_00, 0x01_02_00_00) [];
    InterfaceError = (0xFF_FF_00_00, 0x01_03_00_00) [];
    QueryArgumentError = (0xFF_FF_FF_00, 0x01_03_01_00) [];
    TypeMismatchError = (0xFF_FF_FF_FF, 0x01_03_01_01) [];
    ParameterCountError = (0xFF_FF_FF_FF, 0x01_03_01_02) [];
    UnsupportedTypeError = (0xFF_FF_FF_00, 0x01_03_02_00) [];
    IndexOutOfRangeError = (0xFF_FF_FF_00, 0x01_03_03_00) [];
    InvalidArgumentError = (0xFF_FF_FF_00, 0x01_03_04_00) [];
    ProtocolError = (0xFF_FF_00_00, 0x01_04_00_00) [];
    ProtocolEncodingError = (0xFF_FF_FF_00, 0x01_04_01_00) [];
    ProtocolOutOfOrderError = (0xFF_FF_FF_00, 0x01_04_02_00) [];

    /// Server rejected a statement. The connection stays usable.
    ExecutionError = (0xFF_00_00_00, 0x02_00_00_00) [];
    DataError = (0xFF_FF_00_00, 0x02_01_00_00) [];
    IntegrityConstraintViolationError = (0xFF_FF_00_00, 0x02_02_00_00) [];
    UniqueViolationError = (0xFF_FF_FF_00, 0x02_02_01_00) [];
    TransactionRollbackError = (0xFF_FF_00_00, 0x02_03_00_00) [SHOULD_RETRY];
    SyntaxOrAccessError = (0xFF_FF_00_00, 0x02_04_00_00) [];
    DuplicateObjectError = (0xFF_FF_FF_00, 0x02_04_01_00) [];
    UndefinedObjectError = (0xFF_FF_FF_00, 0x02_04_02_00) [];
    InvalidTransactionStateError = (0xFF_FF_00_00, 0x02_05_00_00) [];

    /// Wraps errors produced by application code, e.g. inside a transaction.
    UserError = (0xFF_00_00_00, 0xFE_00_00_00) [];
}

pub(crate) fn tag_check(code: u32, bit: u32) -> bool {
    get_tags(code) & (1 << bit) != 0
}

/// Pick the most specific kind for a five-character SQLSTATE.
pub(crate) fn sql_state_code(state: &str) -> u32 {
    match state {
        "23505" => UniqueViolationError::CODE,
        "42P04" | "42P06" | "42P07" | "42710" | "42723" => DuplicateObjectError::CODE,
        "3D000" | "42P01" | "42704" | "42883" => UndefinedObjectError::CODE,
        _ => match state.get(..2) {
            Some("22") => DataError::CODE,
            Some("23") => IntegrityConstraintViolationError::CODE,
            Some("25") => InvalidTransactionStateError::CODE,
            Some("40") => TransactionRollbackError::CODE,
            Some("42") => SyntaxOrAccessError::CODE,
            _ => ExecutionError::CODE,
        },
    }
}
