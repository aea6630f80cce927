fn main() {
    hospital_lib::run()
}
