use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let has_stm32f401re = env::var("CARGO_FEATURE_STM32F401RE").is_ok();
    let tim2 = env::var("CARGO_FEATURE_TIME_DRIVER_TIM2").is_ok();
    let tim5 = env::var("CARGO_FEATURE_TIME_DRIVER_TIM5").is_ok();

    if has_stm32f401re && !(tim2 || tim5) {
        panic!("the stm32f401re driver needs one of the features time_driver_tim2 or time_driver_tim5");
    }
    if tim2 && tim5 {
        panic!("only one of time_driver_tim2 and time_driver_tim5 may be enabled");
    }
}
