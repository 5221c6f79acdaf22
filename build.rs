fn main() {
    // Only the ESP-IDF build needs the sysenv forwarded; host builds (tests,
    // fuzzing) compile with `--no-default-features` and skip embuild.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
