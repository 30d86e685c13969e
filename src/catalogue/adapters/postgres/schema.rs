//! Diesel schema for service catalogue persistence.

diesel::table! {
    /// Registered downstream services.
    services (id) {
        /// Internal service identifier.
        id -> Uuid,
        /// Insertion sequence, used for registration order.
        position -> Int8,
        /// Service name, unique among active rows.
        #[max_length = 100]
        name -> Varchar,
        /// Service base url, unique among active rows.
        url -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Soft-delete timestamp.
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Tool lists, one row per service.
    service_tools (service_id) {
        /// Owning service identifier.
        service_id -> Uuid,
        /// Tool descriptors as a JSONB array.
        tools -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last replacement timestamp.
        updated_at -> Timestamptz,
        /// Soft-delete timestamp.
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(service_tools -> services (service_id));
diesel::allow_tables_to_appear_in_same_query!(services, service_tools);
