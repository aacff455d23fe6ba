//! Mock version of std::fs::File;
use mockall::mock;

use std::io::{self, Read};

mock! {
    pub File {}
    impl Read for File {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    }
}
