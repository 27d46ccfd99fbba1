//! CSV fixtures for upload tests

/// Two products with one image each, URLs rooted at `base_url`.
pub fn shoe_and_bag_csv(base_url: &str) -> String {
    format!(
        "S. No.,Product Name,Input Image Urls\n\
         1,Shoe,{base_url}/images/shoe.png\n\
         2,Bag,{base_url}/images/missing-bag.png\n"
    )
}

/// Three products, one with several comma-separated URLs.
pub const THREE_PRODUCTS_CSV: &str = "Product Name,Input Image Urls\n\
    Shoe,https://img.test/shoe.jpg\n\
    Bag,\"https://img.test/bag-front.jpg,https://img.test/bag-back.jpg\"\n\
    Hat,https://img.test/hat.png\n";

pub const HEADER_ONLY_CSV: &str = "Product Name,Input Image Urls\n";

pub const MISSING_COLUMN_CSV: &str = "Product Name,Images\nShoe,https://img.test/shoe.jpg\n";
