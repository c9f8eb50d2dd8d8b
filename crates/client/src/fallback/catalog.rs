//! The built-in product catalog served when the remote is unreachable.
//!
//! Filtering, sorting, and pagination mirror the query semantics of
//! `GET /products` so the two data paths produce the same shapes.

use vexa_core::{Price, ProductId};

use crate::types::{Page, Pagination, Product, ProductQuery, ProductSort};

struct Seed {
    id: &'static str,
    name: &'static str,
    price: i64,
    image: &'static str,
    category: &'static str,
    description: &'static str,
    sizes: &'static [&'static str],
    colors: &'static [&'static str],
    rating: f64,
    stock: i64,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "1",
        name: "Classic Cotton T-Shirt",
        price: 599,
        image: "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?w=400",
        category: "Men",
        description: "Comfortable 100% cotton t-shirt perfect for everyday wear",
        sizes: &["S", "M", "L", "XL"],
        colors: &["White", "Black", "Navy"],
        rating: 4.5,
        stock: 50,
    },
    Seed {
        id: "2",
        name: "Premium Polo Shirt",
        price: 899,
        image: "https://images.unsplash.com/photo-1586790170083-2f9ceadc732d?w=400",
        category: "Men",
        description: "Elegant polo shirt made from premium cotton blend",
        sizes: &["S", "M", "L", "XL"],
        colors: &["White", "Navy", "Gray"],
        rating: 4.8,
        stock: 30,
    },
    Seed {
        id: "3",
        name: "Women's Casual Tee",
        price: 549,
        image: "https://images.unsplash.com/photo-1594633312681-425c7b97ccd1?w=400",
        category: "Women",
        description: "Soft and stylish casual t-shirt for women",
        sizes: &["XS", "S", "M", "L"],
        colors: &["Pink", "White", "Lavender"],
        rating: 4.6,
        stock: 40,
    },
    Seed {
        id: "4",
        name: "Sports Performance Tee",
        price: 799,
        image: "https://images.unsplash.com/photo-1576566588028-4147f3842f27?w=400",
        category: "Sports",
        description: "Moisture-wicking athletic t-shirt for active lifestyles",
        sizes: &["S", "M", "L", "XL"],
        colors: &["Black", "Gray", "Blue"],
        rating: 4.7,
        stock: 25,
    },
    Seed {
        id: "5",
        name: "Kids Fun T-Shirt",
        price: 399,
        image: "https://images.unsplash.com/photo-1503919005314-30d93d07d823?w=400",
        category: "Kids",
        description: "Colorful and comfortable t-shirt for kids",
        sizes: &["XS", "S", "M"],
        colors: &["Red", "Blue", "Green"],
        rating: 4.4,
        stock: 35,
    },
    Seed {
        id: "6",
        name: "Formal Business Shirt",
        price: 1299,
        image: "https://images.unsplash.com/photo-1620012253295-c15cc3e65df4?w=400",
        category: "Formal",
        description: "Crisp formal shirt for professional settings",
        sizes: &["S", "M", "L", "XL"],
        colors: &["White", "Light Blue", "Gray"],
        rating: 4.9,
        stock: 20,
    },
];

/// Build the fixed catalog.
#[must_use]
pub fn seed_catalog() -> Vec<Product> {
    SEEDS
        .iter()
        .map(|seed| Product {
            id: ProductId::new(seed.id),
            name: seed.name.to_string(),
            price: Price::new(seed.price),
            images: vec![seed.image.to_string()],
            category: seed.category.to_string(),
            description: seed.description.to_string(),
            sizes: seed.sizes.iter().map(ToString::to_string).collect(),
            colors: seed.colors.iter().map(ToString::to_string).collect(),
            rating: seed.rating,
            num_reviews: 0,
            stock: Some(seed.stock),
            in_stock: seed.stock > 0,
        })
        .collect()
}

/// Apply query filters, sort, and pagination over the catalog.
#[must_use]
pub fn query_catalog(catalog: &[Product], query: &ProductQuery) -> Page<Product> {
    let mut items: Vec<Product> = catalog
        .iter()
        .filter(|product| matches_query(product, query))
        .cloned()
        .collect();

    if let Some(sort) = query.sort {
        sort_products(&mut items, sort);
    }

    paginate(items, query)
}

fn matches_query(product: &Product, query: &ProductQuery) -> bool {
    if let Some(keyword) = query.keyword.as_deref()
        && !product
            .name
            .to_lowercase()
            .contains(&keyword.to_lowercase())
    {
        return false;
    }
    if let Some(category) = query.category.as_deref()
        && !product.category.eq_ignore_ascii_case(category)
    {
        return false;
    }
    if let Some(min) = query.min_price
        && product.price < min
    {
        return false;
    }
    if let Some(max) = query.max_price
        && product.price > max
    {
        return false;
    }
    true
}

fn sort_products(items: &mut [Product], sort: ProductSort) {
    match sort {
        ProductSort::PriceAsc => items.sort_by_key(|product| product.price),
        ProductSort::PriceDesc => {
            items.sort_by_key(|product| std::cmp::Reverse(product.price));
        }
        ProductSort::RatingDesc => items.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        // The catalog is fixed, so insertion order stands in for recency.
        ProductSort::Newest => {}
    }
}

fn paginate(items: Vec<Product>, query: &ProductQuery) -> Page<Product> {
    let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
    let limit = query.limit.unwrap_or(ProductQuery::DEFAULT_LIMIT).max(1);
    let page = query.page.unwrap_or(1).max(1);
    let pages = total.div_ceil(limit).max(1);

    // Offset math in u64 so an absurd page/limit pair cannot overflow u32.
    let start = usize::try_from(u64::from(page - 1) * u64::from(limit)).unwrap_or(usize::MAX);
    let items: Vec<Product> = items
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect();
    let count = u32::try_from(items.len()).unwrap_or(u32::MAX);

    Page {
        items,
        pagination: Pagination {
            page,
            pages,
            count,
            total,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_catalog_shape() {
        let catalog = seed_catalog();
        assert_eq!(catalog.len(), 6);
        assert!(catalog.iter().all(|product| product.in_stock));
        assert_eq!(catalog[0].id.as_str(), "1");
        assert_eq!(catalog[0].price, Price::new(599));
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let catalog = seed_catalog();
        let query = ProductQuery {
            keyword: Some("polo".to_string()),
            ..ProductQuery::default()
        };
        let page = query_catalog(&catalog, &query);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Premium Polo Shirt");
    }

    #[test]
    fn test_category_filter() {
        let catalog = seed_catalog();
        let query = ProductQuery {
            category: Some("men".to_string()),
            ..ProductQuery::default()
        };
        let page = query_catalog(&catalog, &query);
        assert_eq!(page.items.len(), 2);
        assert!(page.items.iter().all(|product| product.category == "Men"));
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let catalog = seed_catalog();
        let query = ProductQuery {
            min_price: Some(Price::new(599)),
            max_price: Some(Price::new(899)),
            ..ProductQuery::default()
        };
        let page = query_catalog(&catalog, &query);
        let prices: Vec<i64> = page.items.iter().map(|p| p.price.amount()).collect();
        assert!(prices.contains(&599));
        assert!(prices.contains(&899));
        assert!(!prices.contains(&549));
        assert!(!prices.contains(&1299));
    }

    #[test]
    fn test_sort_by_price() {
        let catalog = seed_catalog();
        let query = ProductQuery {
            sort: Some(ProductSort::PriceAsc),
            ..ProductQuery::default()
        };
        let page = query_catalog(&catalog, &query);
        let prices: Vec<i64> = page.items.iter().map(|p| p.price.amount()).collect();
        let mut sorted = prices.clone();
        sorted.sort_unstable();
        assert_eq!(prices, sorted);
    }

    #[test]
    fn test_sort_by_rating_desc() {
        let catalog = seed_catalog();
        let query = ProductQuery {
            sort: Some(ProductSort::RatingDesc),
            ..ProductQuery::default()
        };
        let page = query_catalog(&catalog, &query);
        assert_eq!(page.items[0].name, "Formal Business Shirt");
    }

    #[test]
    fn test_pagination() {
        let catalog = seed_catalog();
        let query = ProductQuery {
            limit: Some(4),
            page: Some(2),
            ..ProductQuery::default()
        };
        let page = query_catalog(&catalog, &query);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.page, 2);
        assert_eq!(page.pagination.pages, 2);
        assert_eq!(page.pagination.count, 2);
        assert_eq!(page.pagination.total, 6);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let catalog = seed_catalog();
        let query = ProductQuery {
            page: Some(5),
            ..ProductQuery::default()
        };
        let page = query_catalog(&catalog, &query);
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 6);
    }

    #[test]
    fn test_extreme_page_and_limit_do_not_overflow() {
        let catalog = seed_catalog();
        let query = ProductQuery {
            page: Some(u32::MAX),
            limit: Some(u32::MAX),
            ..ProductQuery::default()
        };
        let page = query_catalog(&catalog, &query);
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 6);
    }

    #[test]
    fn test_no_match_yields_empty_page() {
        let catalog = seed_catalog();
        let query = ProductQuery {
            keyword: Some("sneaker".to_string()),
            ..ProductQuery::default()
        };
        let page = query_catalog(&catalog, &query);
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.pages, 1);
    }
}
