fn main() {
    // Host builds (`--no-default-features`) have no ESP-IDF toolchain to
    // export; only the device build needs the sysenv link arguments.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
