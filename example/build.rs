fn main() {
    println!("cargo:rustc-link-arg=--nmagic");
    // bins and the defmt-test target both need the cortex-m-rt layout
    println!("cargo:rustc-link-arg=-Tlink.x");
    // panic-probe prints through defmt, so its section layout is always needed
    println!("cargo:rustc-link-arg=-Tdefmt.x");
}
