pub mod catalog;
pub mod codec;

pub use catalog::{describe, mask_of, names, triggered, CriticalAlarm, FlagSet, MaintenanceWarning};
pub use codec::{
    count_set, count_set_wire, decode, decode_wire, encode, encode_wire, format_wire, parse_wire,
    AlarmFlag, CLEAR, MAX_FLAGS,
};
