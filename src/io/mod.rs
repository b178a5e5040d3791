mod json_io;

pub use json_io::{
    read_stand_json, read_stand_json_from_bytes, write_stand_json, write_yields_json, StandFile,
};
