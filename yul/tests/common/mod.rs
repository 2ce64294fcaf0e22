pub mod differential_util;
