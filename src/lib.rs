/*!
# Fanout Logger Lib
A leveled logger which writes every record to stdout and to a log file. The log file rotates itself by size, keeps a bounded number of backups for a bounded number of days, and compresses the backups.

## Example

```rust
use fanout_logger_lib::{info, infof, Level, Logger, RotationPolicy};

use std::fs;
use std::path::Path;

let test_folder = {
  let folder = Path::join(&Path::join(Path::new("tests"), Path::new("out")), "log-example");

  fs::remove_dir_all(&folder);

  fs::create_dir_all(&folder).unwrap();

  folder
};

let test_log_file = Path::join(&test_folder, Path::new("mylog.log"));

let mut policy = RotationPolicy::new(&test_log_file);

policy
    .set_max_size(150) // bytes
    .set_max_backups(3)
    .set_compress(false);

let mut builder = Logger::builder(&test_log_file);

builder.set_policy(policy).set_level(Level::Debug);

{
    let logger = builder.build();

    info!(logger, "Hello world!").unwrap();
    infof!(logger, "{} + {} = {}", 1, 2, 1 + 2).unwrap();

    logger.sync().unwrap();
}

fs::remove_dir_all(test_folder).unwrap();
```

Every record is one line on the console and in the file, like

```text
[INFO]	2024-05-01 12:00:00	main.rs:42	Hello world!
```

Records at `Level::Panic` panic the calling thread after being written, and records at `Level::Fatal` exit the process with the status `1`. Both happen through a `Terminator`, which can be replaced.
*/

mod compress;
mod encoder;
mod fanout;
mod level;
mod logger;
mod macros;
mod rotating_file;
mod rotation_policy;
mod terminate;
mod value;

pub use compress::COMPRESSED_EXTENSION;
pub use encoder::*;
pub use fanout::LogError;
pub use level::Level;
pub use logger::*;
pub use rotating_file::{ErrorHandler, MaintenanceError, RotatingFile};
pub use rotation_policy::{RotationPolicy, MEGABYTE};
pub use terminate::{Abort, ProcessTerminator, Terminator, FATAL_EXIT_CODE};
pub use value::{join_values, Value};
