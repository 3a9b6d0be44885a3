// Diesel schema for the tables created under `migrations/`.

diesel::table! {
    recurring_series (id) {
        id -> Uuid,
        idempotency_key -> Text,
        provider_id -> Uuid,
        customer_id -> Uuid,
        listing_id -> Uuid,
        frequency -> Text,
        pattern -> Jsonb,
        start_date -> Date,
        start_time -> Time,
        duration_minutes -> Int4,
        unit_price_cents -> Int8,
        occurrence_count -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    booking (id) {
        id -> Uuid,
        series_id -> Nullable<Uuid>,
        provider_id -> Uuid,
        customer_id -> Uuid,
        listing_id -> Uuid,
        scheduled_date -> Date,
        start_time -> Time,
        duration_minutes -> Int4,
        price_cents -> Int8,
        status -> Text,
        occurrence_index -> Nullable<Int4>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(booking -> recurring_series (series_id));

diesel::allow_tables_to_appear_in_same_query!(booking, recurring_series);
