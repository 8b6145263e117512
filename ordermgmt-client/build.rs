fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_prost_build::configure()
        .build_server(false)
        .build_client(true)
        .compile_protos(
            &[
                "../proto/order_management.proto",
                "../proto/product_info.proto",
            ],
            &["../proto"],
        )?;
    Ok(())
}
