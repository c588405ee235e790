fn main() {
    std::process::exit(fleetcomp_lib::run());
}
